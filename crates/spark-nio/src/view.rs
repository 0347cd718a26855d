//! 类型化视图：元素索引到字节偏移的换算与编解码。
//!
//! # 模块定位（Why）
//! - 调用方面对的是“第 i 个 int/float”，底层存储只认字节；
//!   [`TypedView`] 负责 `byte_offset = index * T::SIZE` 的换算，并按视图自身的字节序编解码；
//! - 游标与容量策略全部委托给 [`BaseBuffer`]，这里不重复任何边界算术。
//!
//! # 契约说明（What）
//! - 对外暴露的 position/limit/capacity/remaining 均以**元素**为单位；
//!   `capacity = ceil(byte_capacity / SIZE)`，但任何访问都按字节做边界检查，
//!   不会读写到半个元素；
//! - 批量传输是原子的：源/目标区间与缓冲边界全部校验通过后才开始拷贝。

use core::{fmt, marker::PhantomData};

use crate::{
    base::{BaseBuffer, Extent},
    config::{BufferConfig, GrowthPolicy},
    element::Element,
    error::{BufferError, Result, check_range, element_offset},
    order::ByteOrder,
    store::BackingStore,
};

/// 以元素 `T` 读写共享字节存储的视图。
///
/// # 教案式说明
/// - **意图 (Why)**：一个泛型实现覆盖 byte/short/int/float/long/double 六种视图，
///   由封闭的 [`Element`] trait 限定元素集合；
/// - **架构关系 (How)**：`base` 持有共享存储句柄与游标；`PhantomData<T>` 仅标记元素类型；
/// - **契约 (What)**：
///   - 相对读写推进 position，绝对读写不改变 position；
///   - 写操作在只读视图上返回 `ReadOnlyViolation`；
///   - 相对写入的容量行为由 [`GrowthPolicy`] 决定，绝对写入从不扩容。
/// - **风险 (Trade-offs)**：视图是 `!Send` 的单线程对象；[`TypedView::with_bytes`]
///   的闭包执行期间，共享同一存储的其它视图仍可读取，但任何写入或扩缩容都返回
///   `InvalidOperation`。
pub struct TypedView<T: Element> {
    base: BaseBuffer,
    _element: PhantomData<T>,
}

/// 字节视图。
pub type ByteView = TypedView<u8>;
/// 16 位有符号整数视图。
pub type ShortView = TypedView<i16>;
/// 32 位有符号整数视图。
pub type IntView = TypedView<i32>;
/// 32 位浮点视图。
pub type FloatView = TypedView<f32>;
/// 64 位有符号整数视图。
pub type LongView = TypedView<i64>;
/// 64 位浮点视图。
pub type DoubleView = TypedView<f64>;

impl<T: Element> TypedView<T> {
    /// 分配可容纳 `capacity` 个元素的视图，使用默认配置。
    pub fn allocate(capacity: usize) -> Result<Self> {
        Self::allocate_with(capacity, BufferConfig::default())
    }

    /// 按给定配置分配视图。
    ///
    /// # 契约说明（What）
    /// - 新视图 `position = 0`、`limit = capacity`、`length = 0`，全部字节为零；
    /// - `capacity * T::SIZE` 溢出时返回 `InvalidArgument`。
    pub fn allocate_with(capacity: usize, config: BufferConfig) -> Result<Self> {
        let bytes = capacity.checked_mul(T::SIZE).ok_or_else(|| {
            BufferError::invalid_argument(
                "allocate",
                format!("{capacity} {} elements overflow the address space", T::KIND),
            )
        })?;
        tracing::trace!(capacity, element = T::KIND.name(), "view allocated");
        Ok(Self::from_base(BaseBuffer::allocate(bytes, T::SIZE, config)))
    }

    /// 以默认配置把 `values` 编码进一块新存储。
    pub fn wrap(values: &[T]) -> Result<Self> {
        Self::wrap_with(values, BufferConfig::default())
    }

    /// 把 `values` 按 `config.order` 编码进一块新存储。
    ///
    /// # 契约说明（What）
    /// - 多字节元素无法与调用方数组共享内存，因此这里总是复制；
    ///   需要零拷贝接管字节数组时使用 [`ByteView::wrap_vec`]；
    /// - 新视图 `position = 0`、`limit = length = capacity = values.len()`；
    /// - 空数组返回 `EmptyBackingMemory`。
    pub fn wrap_with(values: &[T], config: BufferConfig) -> Result<Self> {
        Self::wrap_range_with(values, 0, values.len(), config)
    }

    /// 以默认配置包装 `values`，并把可读写窗口设为 `[offset, offset + len)`（元素）。
    pub fn wrap_range(values: &[T], offset: usize, len: usize) -> Result<Self> {
        Self::wrap_range_with(values, offset, len, BufferConfig::default())
    }

    /// 复制全部 `values`，游标落在 `[offset, offset + len)` 上。
    ///
    /// # 契约说明（What）
    /// - `position = offset`、`limit = offset + len`、`capacity = length = values.len()`；
    /// - 空数组返回 `EmptyBackingMemory`，区间越过 `values.len()` 返回 `IndexOutOfRange`。
    pub fn wrap_range_with(
        values: &[T],
        offset: usize,
        len: usize,
        config: BufferConfig,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(BufferError::EmptyBackingMemory { op: "wrap" });
        }
        let end = check_range("wrap", offset, len, values.len())?;
        let mut bytes = vec![0u8; values.len() * T::SIZE];
        encode_from(config.order, values, &mut bytes);
        let capacity = bytes.len();
        let store = BackingStore::from_vec(bytes).into_shared();
        tracing::trace!(capacity, offset, len, element = T::KIND.name(), "view wraps a copy");
        let base = BaseBuffer::from_parts(
            store,
            Extent::Whole,
            T::SIZE,
            offset * T::SIZE,
            end * T::SIZE,
            capacity,
            config,
        );
        Ok(Self::from_base(base))
    }

    pub(crate) fn from_base(base: BaseBuffer) -> Self {
        Self {
            base,
            _element: PhantomData,
        }
    }

    pub(crate) fn into_base(self) -> BaseBuffer {
        self.base
    }

    /// 把同宽度的视图换成另一个元素类型，基座（含 mark）原样移交。
    ///
    /// 仅用于 `T` 与 `U` 实为同一类型、但编译期无法证明的场合。
    pub(crate) fn retype<U: Element>(self) -> TypedView<U> {
        debug_assert_eq!(T::SIZE, U::SIZE);
        TypedView {
            base: self.base,
            _element: PhantomData,
        }
    }

    pub(crate) fn base_mut(&mut self) -> &mut BaseBuffer {
        &mut self.base
    }

    /// 字节粒度的游标与配置。
    pub fn base(&self) -> &BaseBuffer {
        &self.base
    }

    /// 元素宽度（字节）。
    pub const fn element_size(&self) -> usize {
        T::SIZE
    }

    /// 容量（元素），`ceil(byte_capacity / SIZE)`。
    pub fn capacity(&self) -> usize {
        self.base.byte_capacity().div_ceil(T::SIZE)
    }

    pub fn position(&self) -> usize {
        self.base.byte_position() / T::SIZE
    }

    pub fn limit(&self) -> usize {
        self.base.byte_limit() / T::SIZE
    }

    /// 写入高水位（元素）。
    pub fn length(&self) -> usize {
        self.base.byte_length() / T::SIZE
    }

    /// `(limit - position) / SIZE`。
    pub fn remaining(&self) -> usize {
        self.base.remaining_bytes() / T::SIZE
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn order(&self) -> ByteOrder {
        self.base.order()
    }

    /// 调整本视图的字节序；不影响共享同一存储的其它视图。
    pub fn set_order(&mut self, order: ByteOrder) -> &mut Self {
        let config = self.base.config().with_order(order);
        self.base.set_config(config);
        self
    }

    pub fn is_big_endian(&self) -> bool {
        self.base.is_big_endian()
    }

    pub fn is_read_only(&self) -> bool {
        self.base.is_read_only()
    }

    pub fn is_direct(&self) -> bool {
        self.base.is_direct()
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.base.growth()
    }

    pub fn config(&self) -> BufferConfig {
        self.base.config()
    }

    /// 设置 position（元素）；超过 limit 返回 `InvalidArgument`。
    pub fn set_position(&mut self, position: usize) -> Result<&mut Self> {
        let bytes = self.element_bytes("set_position", position)?;
        self.base.set_position_bytes("set_position", bytes)?;
        Ok(self)
    }

    /// 设置 limit（元素）；超过 capacity 返回 `InvalidArgument`。
    ///
    /// `limit == capacity()` 时对齐到字节容量，容量不是元素宽度整数倍时也能覆盖到末尾。
    pub fn set_limit(&mut self, limit: usize) -> Result<&mut Self> {
        let bytes = if limit == self.capacity() {
            self.base.byte_capacity()
        } else {
            self.element_bytes("set_limit", limit)?
        };
        self.base.set_limit_bytes("set_limit", bytes)?;
        Ok(self)
    }

    pub fn flip(&mut self) -> &mut Self {
        self.base.flip();
        self
    }

    pub fn rewind(&mut self) -> &mut Self {
        self.base.rewind();
        self
    }

    pub fn mark(&mut self) -> &mut Self {
        self.base.mark();
        self
    }

    /// 回到 mark；未设置时返回 `InvalidOperation`。
    pub fn reset(&mut self) -> Result<&mut Self> {
        self.base.reset()?;
        Ok(self)
    }

    /// 清零全部字节并复位游标。
    pub fn clear(&mut self) -> Result<&mut Self> {
        self.base.clear()?;
        Ok(self)
    }

    /// 扩容 `extra_bytes` 字节（向上取整到元素宽度）。
    pub fn resize(&mut self, extra_bytes: usize) -> Result<&mut Self> {
        self.base.resize(extra_bytes)?;
        Ok(self)
    }

    /// 把存储缩容到 limit。
    pub fn shrink(&mut self) -> Result<&mut Self> {
        self.base.shrink()?;
        Ok(self)
    }

    /// 把未读数据搬到开头，准备继续写入。
    pub fn compact(&mut self) -> Result<&mut Self> {
        self.base.compact()?;
        Ok(self)
    }

    /// 相对读取一个元素。
    pub fn get(&mut self) -> Result<T> {
        let start = self.base.claim_read("get", T::SIZE)?;
        Ok(self.decode_at(start))
    }

    /// 绝对读取第 `index` 个元素，不移动 position。
    pub fn get_at(&self, index: usize) -> Result<T> {
        let offset = element_offset("get_at", index, T::SIZE, self.base.byte_capacity())?;
        self.base.check_absolute("get_at", offset, T::SIZE)?;
        Ok(self.decode_at(offset))
    }

    /// 相对写入一个元素。
    pub fn put(&mut self, value: T) -> Result<&mut Self> {
        let start = self.base.claim_write("put", T::SIZE)?;
        self.encode_at(start, value);
        Ok(self)
    }

    /// 绝对写入第 `index` 个元素，不移动 position，从不扩容。
    pub fn put_at(&mut self, index: usize, value: T) -> Result<&mut Self> {
        let offset = element_offset("put_at", index, T::SIZE, self.base.byte_capacity())?;
        self.base.claim_absolute_write("put_at", offset, T::SIZE)?;
        self.encode_at(offset, value);
        Ok(self)
    }

    /// 相对读取 `len` 个元素到 `dst[offset..offset + len]`。
    ///
    /// # 契约说明（What）
    /// - `dst` 区间非法、或 `position + len * SIZE > limit` 时返回 `IndexOutOfRange`，
    ///   此时 `dst` 与 position 均未改动。
    pub fn get_slice(&mut self, dst: &mut [T], offset: usize, len: usize) -> Result<&mut Self> {
        let end = check_range("get_slice", offset, len, dst.len())?;
        let bytes = self.element_bytes("get_slice", len)?;
        let start = self.base.claim_read("get_slice", bytes)?;
        let order = self.order();
        self.base
            .with_range(start..start + bytes, |src| decode_into(order, src, &mut dst[offset..end]));
        Ok(self)
    }

    /// 相对读取直到填满 `dst`。
    pub fn get_into(&mut self, dst: &mut [T]) -> Result<&mut Self> {
        let len = dst.len();
        self.get_slice(dst, 0, len)
    }

    /// 相对写入 `src[offset..offset + len]`。
    ///
    /// # 契约说明（What）
    /// - `src` 区间非法返回 `IndexOutOfRange`；
    /// - 容量行为与 [`put`](Self::put) 相同：`Growable` 自动扩容，`Fixed` 越过 limit 返回 `BufferOverflow`；
    /// - 失败时不写入任何元素。
    pub fn put_slice(&mut self, src: &[T], offset: usize, len: usize) -> Result<&mut Self> {
        let end = check_range("put_slice", offset, len, src.len())?;
        let bytes = self.element_bytes("put_slice", len)?;
        let start = self.base.claim_write("put_slice", bytes)?;
        let order = self.order();
        self.base
            .with_range_mut(start..start + bytes, |dst| encode_from(order, &src[offset..end], dst));
        Ok(self)
    }

    /// 相对写入整个 `src`。
    pub fn put_all(&mut self, src: &[T]) -> Result<&mut Self> {
        self.put_slice(src, 0, src.len())
    }

    /// 从第 `index` 个元素起绝对读取 `dst.len()` 个元素。
    pub fn get_slice_at(&self, index: usize, dst: &mut [T]) -> Result<()> {
        let capacity = self.base.byte_capacity();
        let offset = element_offset("get_slice_at", index, T::SIZE, capacity)?;
        let bytes = self.element_bytes("get_slice_at", dst.len())?;
        self.base.check_absolute("get_slice_at", offset, bytes)?;
        let order = self.order();
        self.base
            .with_range(offset..offset + bytes, |src| decode_into(order, src, dst));
        Ok(())
    }

    /// 从第 `index` 个元素起绝对写入 `src`，越过容量返回 `IndexOutOfRange`。
    pub fn put_slice_at(&mut self, index: usize, src: &[T]) -> Result<&mut Self> {
        let capacity = self.base.byte_capacity();
        let offset = element_offset("put_slice_at", index, T::SIZE, capacity)?;
        let bytes = self.element_bytes("put_slice_at", src.len())?;
        self.base.claim_absolute_write("put_slice_at", offset, bytes)?;
        let order = self.order();
        self.base
            .with_range_mut(offset..offset + bytes, |dst| encode_from(order, src, dst));
        Ok(self)
    }

    /// 复制 `[0, limit)` 内的全部元素。
    pub fn to_vec(&self) -> Vec<T> {
        let count = self.limit();
        let mut out = vec![T::default(); count];
        let order = self.order();
        self.base
            .with_range(0..count * T::SIZE, |src| decode_into(order, src, &mut out));
        out
    }

    /// 在闭包内借用 `[0, limit)` 的原始字节。
    ///
    /// 闭包返回后借用即结束，扩容/缩容不会留下悬垂切片；闭包内对同一存储的写入会被拒绝。
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.base.with_range(0..self.base.byte_limit(), f)
    }

    fn element_bytes(&self, op: &'static str, count: usize) -> Result<usize> {
        count.checked_mul(T::SIZE).ok_or_else(|| {
            BufferError::invalid_argument(op, format!("{count} elements overflow the address space"))
        })
    }

    fn decode_at(&self, offset: usize) -> T {
        let order = self.order();
        self.base
            .with_range(offset..offset + T::SIZE, |src| T::decode(order, src))
    }

    fn encode_at(&self, offset: usize, value: T) {
        let order = self.order();
        self.base
            .with_range_mut(offset..offset + T::SIZE, |dst| value.encode(order, dst));
    }
}

impl<T: Element> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("element", &T::KIND)
            .field("position", &self.position())
            .field("limit", &self.limit())
            .field("capacity", &self.capacity())
            .field("length", &self.length())
            .field("order", &self.order())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl<T: Element> fmt::Display for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[pos={} lim={} cap={}]",
            T::KIND.view_name(),
            self.position(),
            self.limit(),
            self.capacity()
        )
    }
}

pub(crate) fn decode_into<T: Element>(order: ByteOrder, src: &[u8], dst: &mut [T]) {
    for (slot, chunk) in dst.iter_mut().zip(src.chunks_exact(T::SIZE)) {
        *slot = T::decode(order, chunk);
    }
}

pub(crate) fn encode_from<T: Element>(order: ByteOrder, src: &[T], dst: &mut [u8]) {
    for (value, chunk) in src.iter().zip(dst.chunks_exact_mut(T::SIZE)) {
        value.encode(order, chunk);
    }
}
