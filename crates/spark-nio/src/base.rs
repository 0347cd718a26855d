//! 所有视图共享的游标状态与通用操作。
//!
//! # 模块定位（Why）
//! - position/limit/length/mark 的维护、flip/clear/compact 等操作与元素类型无关，
//!   集中在 [`BaseBuffer`] 中实现一次，类型视图只负责偏移换算与编解码；
//! - 游标在内部一律以**相对视图起点的字节偏移**保存，不同宽度的视图共享同一套边界算术。
//!
//! # 设计概要（How）
//! - `store`：共享存储句柄；`extent` 描述视图覆盖整块存储还是固定窗口（切片）；
//! - 视图容量总是从存储**实时**计算：同一存储上的兄弟视图缩容后，
//!   本视图在下一次可变操作开头通过 `sync` 把游标夹回新边界；
//! - 所有校验都发生在借用存储之前，失败时不改动任何字节或游标。
//!
//! # 契约说明（What）
//! - 每个公开操作结束后：`position <= limit <= capacity`、`length <= capacity`、
//!   `mark <= position`（若已设置）；
//! - 窗口视图不能扩容或缩容，相关操作返回 `InvalidOperation`。

use std::ops::Range;

use crate::{
    config::{BufferConfig, GrowthPolicy},
    error::{BufferError, Result, check_range},
    order::ByteOrder,
    store::{BackingStore, SharedStore},
};

/// 视图在存储中覆盖的区域。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Extent {
    /// 覆盖整块存储，随存储扩缩容。
    Whole,
    /// 固定窗口 `[offset, offset + len)`，用于切片。
    Window { offset: usize, len: usize },
}

/// 视图的公共基座。
///
/// # 教案式说明
/// - **意图 (Why)**：把 NIO 的游标模型与存储共享策略从元素编解码中剥离；
/// - **契约 (What)**：通过 [`crate::TypedView::base`] 获得只读引用，用于观察字节粒度的游标；
///   所有修改均经由类型视图的方法进入，保证元素宽度相关的取整规则一致；
/// - **风险 (Trade-offs)**：`Clone` 只复制句柄与游标，两份副本共享同一块字节。
#[derive(Clone, Debug)]
pub struct BaseBuffer {
    store: SharedStore,
    extent: Extent,
    element_size: usize,
    position: usize,
    limit: usize,
    length: usize,
    mark: Option<usize>,
    config: BufferConfig,
}

impl BaseBuffer {
    /// 在一块新分配的存储上构造覆盖全部字节的基座。
    pub(crate) fn allocate(capacity_bytes: usize, element_size: usize, config: BufferConfig) -> Self {
        Self::over_store(
            BackingStore::allocate(capacity_bytes).into_shared(),
            element_size,
            config,
        )
    }

    /// 在已有存储上构造覆盖全部字节的基座，游标为初始状态。
    pub(crate) fn over_store(store: SharedStore, element_size: usize, config: BufferConfig) -> Self {
        let capacity = store.borrow().capacity();
        Self {
            store,
            extent: Extent::Whole,
            element_size,
            position: 0,
            limit: capacity,
            length: 0,
            mark: None,
            config,
        }
    }

    /// 以显式游标构造，调用方保证各字段满足不变量。
    pub(crate) fn from_parts(
        store: SharedStore,
        extent: Extent,
        element_size: usize,
        position: usize,
        limit: usize,
        length: usize,
        config: BufferConfig,
    ) -> Self {
        let mut base = Self {
            store,
            extent,
            element_size,
            position,
            limit,
            length,
            mark: None,
            config,
        };
        base.sync();
        base
    }

    pub(crate) fn store(&self) -> &SharedStore {
        &self.store
    }

    pub(crate) fn into_store(self) -> SharedStore {
        self.store
    }

    pub(crate) fn extent(&self) -> Extent {
        self.extent
    }

    pub(crate) fn config(&self) -> BufferConfig {
        self.config
    }

    pub(crate) fn set_config(&mut self, config: BufferConfig) {
        self.config = config;
    }

    /// 视图起点在存储中的字节偏移。
    pub(crate) fn origin(&self) -> usize {
        match self.extent {
            Extent::Whole => 0,
            Extent::Window { offset, .. } => offset,
        }
    }

    /// 当前容量（字节），从存储实时计算。
    pub fn byte_capacity(&self) -> usize {
        let store_capacity = self.store.borrow().capacity();
        match self.extent {
            Extent::Whole => store_capacity,
            Extent::Window { offset, len } => len.min(store_capacity.saturating_sub(offset)),
        }
    }

    pub fn byte_limit(&self) -> usize {
        self.limit.min(self.byte_capacity())
    }

    pub fn byte_position(&self) -> usize {
        self.position.min(self.byte_limit())
    }

    pub fn byte_length(&self) -> usize {
        self.length.min(self.byte_capacity())
    }

    pub fn byte_mark(&self) -> Option<usize> {
        let position = self.byte_position();
        self.mark.filter(|mark| *mark <= position)
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn order(&self) -> ByteOrder {
        self.config.order
    }

    pub fn is_big_endian(&self) -> bool {
        self.config.order.is_big_endian()
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn is_direct(&self) -> bool {
        self.config.direct
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.config.growth
    }

    /// 视图是否为固定窗口（切片）。
    pub fn is_windowed(&self) -> bool {
        matches!(self.extent, Extent::Window { .. })
    }

    /// 剩余可读字节数。
    pub fn remaining_bytes(&self) -> usize {
        self.byte_limit() - self.byte_position()
    }

    /// 把游标夹回实时容量之内。兄弟视图缩容后由此恢复不变量。
    pub(crate) fn sync(&mut self) {
        let capacity = self.byte_capacity();
        self.limit = self.limit.min(capacity);
        self.position = self.position.min(self.limit);
        self.length = self.length.min(capacity);
        if self.mark.is_some_and(|mark| mark > self.position) {
            self.mark = None;
        }
    }

    /// 写入前置校验：视图可写，且存储当前没有被 `with_bytes` 的闭包借出。
    ///
    /// 单线程下校验通过后直到本次操作结束都不会再有外部借用，后续 `borrow_mut` 不会失败。
    pub(crate) fn ensure_writable(&self, op: &'static str) -> Result<()> {
        if self.config.read_only {
            return Err(BufferError::ReadOnlyViolation { op });
        }
        if self.store.try_borrow_mut().is_err() {
            return Err(BufferError::InvalidOperation {
                op,
                detail: "backing store is borrowed by an active with_bytes closure",
            });
        }
        Ok(())
    }

    pub(crate) fn set_position_bytes(&mut self, op: &'static str, position: usize) -> Result<()> {
        self.sync();
        if position > self.limit {
            return Err(BufferError::invalid_argument(
                op,
                format!("position {position} exceeds limit {}", self.limit),
            ));
        }
        self.position = position;
        if self.mark.is_some_and(|mark| mark > position) {
            self.mark = None;
        }
        Ok(())
    }

    pub(crate) fn set_limit_bytes(&mut self, op: &'static str, limit: usize) -> Result<()> {
        self.sync();
        let capacity = self.byte_capacity();
        if limit > capacity {
            return Err(BufferError::invalid_argument(
                op,
                format!("limit {limit} exceeds capacity {capacity}"),
            ));
        }
        self.limit = limit;
        self.position = self.position.min(limit);
        if self.mark.is_some_and(|mark| mark > limit) {
            self.mark = None;
        }
        Ok(())
    }

    /// `limit = position; position = 0`，丢弃 mark。
    pub(crate) fn flip(&mut self) {
        self.sync();
        self.limit = self.position;
        self.position = 0;
        self.mark = None;
    }

    /// `position = 0`，limit 不变，丢弃 mark。
    pub(crate) fn rewind(&mut self) {
        self.sync();
        self.position = 0;
        self.mark = None;
    }

    pub(crate) fn mark(&mut self) {
        self.sync();
        self.mark = Some(self.position);
    }

    /// 恢复到 mark 并消费它；mark 只在一次 `mark()` 与下一次 `reset()` 之间有效。
    pub(crate) fn reset(&mut self) -> Result<()> {
        self.sync();
        match self.mark.take() {
            Some(mark) => {
                self.position = mark;
                Ok(())
            }
            None => Err(BufferError::InvalidOperation {
                op: "reset",
                detail: "mark is not set",
            }),
        }
    }

    /// 清零 `[0, capacity)` 并复位游标。
    pub(crate) fn clear(&mut self) -> Result<()> {
        self.ensure_writable("clear")?;
        self.sync();
        let capacity = self.byte_capacity();
        let origin = self.origin();
        if capacity > 0 {
            self.store.borrow_mut().zero(origin..origin + capacity);
        }
        self.position = 0;
        self.length = 0;
        self.limit = capacity;
        self.mark = None;
        tracing::trace!(capacity, "view cleared");
        Ok(())
    }

    /// 扩容 `extra` 字节，向上取整到元素宽度。
    ///
    /// # 契约说明（What）
    /// - `extra == 0` 为空操作；
    /// - 若扩容前 `limit == capacity`，limit 跟随新容量，否则保持不变；
    /// - 窗口视图返回 `InvalidOperation`，只读视图返回 `ReadOnlyViolation`。
    pub(crate) fn resize(&mut self, extra: usize) -> Result<()> {
        if extra == 0 {
            return Ok(());
        }
        self.ensure_writable("resize")?;
        if self.is_windowed() {
            return Err(BufferError::InvalidOperation {
                op: "resize",
                detail: "a sliced view has a fixed window and cannot grow",
            });
        }
        let rounded = extra
            .checked_next_multiple_of(self.element_size)
            .ok_or_else(|| BufferError::invalid_argument("resize", format!("extra {extra} overflows")))?;
        self.sync();
        let old_capacity = self.byte_capacity();
        if old_capacity.checked_add(rounded).is_none() {
            return Err(BufferError::invalid_argument(
                "resize",
                format!("capacity {old_capacity} + {rounded} overflows"),
            ));
        }
        let follow_limit = self.limit == old_capacity;
        self.store.borrow_mut().grow(rounded);
        if follow_limit {
            self.limit = self.byte_capacity();
        }
        self.sync();
        tracing::debug!(
            extra = rounded,
            capacity = self.byte_capacity(),
            element_size = self.element_size,
            "view resized"
        );
        Ok(())
    }

    /// 把存储缩容到恰好 `limit` 字节。
    pub(crate) fn shrink(&mut self) -> Result<()> {
        self.ensure_writable("shrink")?;
        if self.is_windowed() {
            return Err(BufferError::InvalidOperation {
                op: "shrink",
                detail: "a sliced view does not own its backing store",
            });
        }
        self.sync();
        let target = self.limit;
        if target == self.byte_capacity() {
            return Ok(());
        }
        self.store.borrow_mut().shrink(target);
        self.sync();
        tracing::debug!(capacity = target, "view shrunk to limit");
        Ok(())
    }

    /// 把 `[position, limit)` 搬到开头，`position = limit - position`，`limit = capacity`。
    pub(crate) fn compact(&mut self) -> Result<()> {
        self.ensure_writable("compact")?;
        self.sync();
        let origin = self.origin();
        let unread = self.limit - self.position;
        if self.position > 0 && unread > 0 {
            self.store.borrow_mut().copy_within(
                origin + self.position..origin + self.limit,
                origin,
            );
        }
        self.position = unread;
        self.limit = self.byte_capacity();
        self.length = self.length.max(unread);
        self.mark = None;
        tracing::trace!(unread, "view compacted");
        Ok(())
    }

    /// 为相对读取占用 `len` 字节，返回起始偏移并推进 position。
    pub(crate) fn claim_read(&mut self, op: &'static str, len: usize) -> Result<usize> {
        self.sync();
        let start = self.position;
        self.position = check_range(op, start, len, self.limit)?;
        Ok(start)
    }

    /// 为相对写入占用 `len` 字节，按容量策略扩容或报错，返回起始偏移并推进 position。
    ///
    /// # 执行步骤（How）
    /// 1. 只读校验；
    /// 2. `Fixed`：以 limit 为界，越界返回 `BufferOverflow`；
    /// 3. `Growable`：以容量为界，不足时按“至少翻倍”扩容；写入终点超过 limit 时推进 limit；
    /// 4. 更新 position 与 length。
    pub(crate) fn claim_write(&mut self, op: &'static str, len: usize) -> Result<usize> {
        self.ensure_writable(op)?;
        self.sync();
        let start = self.position;
        let end = start.checked_add(len).ok_or_else(|| {
            BufferError::out_of_range(op, start, len, self.limit)
        })?;
        match self.config.growth {
            GrowthPolicy::Fixed => {
                if end > self.limit {
                    return Err(BufferError::BufferOverflow {
                        op,
                        required: len,
                        limit: self.limit,
                    });
                }
            }
            GrowthPolicy::Growable => {
                let capacity = self.byte_capacity();
                if end > capacity {
                    if self.is_windowed() {
                        return Err(BufferError::BufferOverflow {
                            op,
                            required: len,
                            limit: capacity,
                        });
                    }
                    let extra = (end - capacity).max(capacity);
                    self.resize(extra)?;
                }
                if end > self.limit {
                    self.limit = end;
                }
            }
        }
        self.position = end;
        self.length = self.length.max(end);
        Ok(start)
    }

    /// 校验绝对读取区间 `[offset, offset + len)` 落在容量之内。
    pub(crate) fn check_absolute(&self, op: &'static str, offset: usize, len: usize) -> Result<()> {
        check_range(op, offset, len, self.byte_capacity()).map(|_| ())
    }

    /// 校验绝对写入并更新 length；绝对写入从不扩容。
    pub(crate) fn claim_absolute_write(
        &mut self,
        op: &'static str,
        offset: usize,
        len: usize,
    ) -> Result<()> {
        self.ensure_writable(op)?;
        self.sync();
        let end = check_range(op, offset, len, self.byte_capacity())?;
        self.length = self.length.max(end);
        Ok(())
    }

    /// 以只读方式访问视图内的字节区间；调用方已完成边界检查。
    ///
    /// 窗口起点落在已缩容存储之外时容量为零，此时只可能出现空区间，闭包拿到空切片。
    pub(crate) fn with_range<R>(&self, range: Range<usize>, f: impl FnOnce(&[u8]) -> R) -> R {
        let origin = self.origin();
        let store = self.store.borrow();
        let bytes = store
            .as_slice()
            .get(origin + range.start..origin + range.end)
            .unwrap_or(&[]);
        f(bytes)
    }

    /// 以可写方式访问视图内的字节区间；调用方已完成边界与可写检查。
    pub(crate) fn with_range_mut<R>(
        &self,
        range: Range<usize>,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> R {
        let origin = self.origin();
        let mut store = self.store.borrow_mut();
        let bytes = store
            .as_mut_slice()
            .get_mut(origin + range.start..origin + range.end)
            .unwrap_or(&mut []);
        f(bytes)
    }
}
