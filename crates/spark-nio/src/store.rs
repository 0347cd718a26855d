//! 单块可增长字节存储。
//!
//! # 模块定位（Why）
//! - 所有视图最终读写的是同一块连续内存；本模块是这块内存的唯一所有者，
//!   负责分配、扩容、缩容与释放。
//! - 底层使用 `bytes::BytesMut`，与工作区内其它缓冲实现保持同一内存模型。
//!
//! # 设计概要（How）
//! - 扩容与缩容都会产生一块**全新**的分配，并把需要保留的前缀复制过去，
//!   不存在“部分别名”的中间态；
//! - 视图通过 [`SharedStore`]（`Rc<RefCell<BackingStore>>`）共享所有权，
//!   替换内部分配后，所有共享该存储的视图在下一次访问时自然看到新内存；
//! - `Drop` 时清零全部字节，随后归还分配。
//!
//! # 契约说明（What）
//! - 分配长度恒等于容量：`len() == capacity()`，新增区域一律为零；
//! - 单线程模型：`Rc`/`RefCell` 使共享句柄 `!Send`，编译器阻止跨线程共享。

use std::{cell::RefCell, ops::Range, rc::Rc};

use bytes::{Bytes, BytesMut};

/// 视图之间共享的存储句柄。
pub type SharedStore = Rc<RefCell<BackingStore>>;

/// 单块字节分配的独占所有者。
#[derive(Debug)]
pub struct BackingStore {
    bytes: BytesMut,
}

impl BackingStore {
    /// 分配 `capacity` 字节的零填充存储。
    pub fn allocate(capacity: usize) -> Self {
        tracing::trace!(capacity, "backing store allocated");
        Self {
            bytes: BytesMut::zeroed(capacity),
        }
    }

    /// 直接接管调用方的 `Vec<u8>`，不复制字节。
    ///
    /// 新建的 `Bytes` 引用计数为一，`try_into_mut` 必然夺回可写所有权；
    /// 失败分支仅为类型完备而存在，退化为一次复制。
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let bytes = match Bytes::from(bytes).try_into_mut() {
            Ok(writable) => writable,
            Err(shared) => BytesMut::from(&shared[..]),
        };
        Self { bytes }
    }

    /// 包装为可在视图间共享的句柄。
    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    /// 当前容量（字节）。
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// 扩容 `extra` 字节。
    ///
    /// # 契约说明（What）
    /// - `extra == 0` 时不做任何事；
    /// - 成功后旧内容完整保留在 `[0, old_capacity)`，新增尾部为零；
    /// - 任何此前借出的切片都指向旧分配，调用方必须重新获取。
    pub fn grow(&mut self, extra: usize) {
        if extra == 0 {
            return;
        }
        let old = self.capacity();
        let new_capacity = old.saturating_add(extra);
        self.reallocate(new_capacity);
        tracing::debug!(old, new_capacity, "backing store grown");
    }

    /// 缩容到 `new_capacity` 字节，截断尾部。
    ///
    /// `new_capacity >= capacity()` 时不做任何事。
    pub fn shrink(&mut self, new_capacity: usize) {
        let old = self.capacity();
        if new_capacity >= old {
            return;
        }
        self.reallocate(new_capacity);
        tracing::debug!(old, new_capacity, "backing store shrunk");
    }

    /// 将区间内的字节清零。
    pub fn zero(&mut self, range: Range<usize>) {
        self.bytes[range].fill(0);
    }

    /// 将 `src` 区间的字节搬移到以 `dst` 开头的位置，允许重叠。
    pub fn copy_within(&mut self, src: Range<usize>, dst: usize) {
        self.bytes.copy_within(src, dst);
    }

    /// 交还底层字节的所有权，不复制。
    pub fn into_vec(mut self) -> Vec<u8> {
        Vec::from(std::mem::take(&mut self.bytes))
    }

    /// 生成一块内容相同但互不共享的新存储。
    pub fn deep_copy(&self) -> Self {
        Self {
            bytes: BytesMut::from(&self.bytes[..]),
        }
    }

    fn reallocate(&mut self, new_capacity: usize) {
        let keep = self.capacity().min(new_capacity);
        let mut fresh = BytesMut::zeroed(new_capacity);
        fresh[..keep].copy_from_slice(&self.bytes[..keep]);
        let mut old = std::mem::replace(&mut self.bytes, fresh);
        old.fill(0);
    }
}

impl Drop for BackingStore {
    fn drop(&mut self) {
        self.bytes.fill(0);
        tracing::trace!(capacity = self.bytes.len(), "backing store released");
    }
}
