//! 字节视图的专有能力：零拷贝包装与按字节偏移读写任意定宽元素。
//!
//! # 设计背景（Why）
//! - 上层编码器通常按“字节偏移”拼装异构记录（头部 int + 若干 float），
//!   为此单独转换一个类型视图既啰嗦又要求对齐；字节视图直接提供混合宽度的读写入口；
//! - 字节数组是唯一能够与调用方**共享**而非复制的输入形态，`wrap_vec` 直接接管 `Vec<u8>`，
//!   `into_vec` 在独占时原样交还。
//!
//! # 契约说明（What）
//! - `*_scalar_at` 的 `byte_offset` 以字节计，不要求对齐；边界按 `[offset, offset + U::SIZE)` 检查；
//! - 相对版本与 `get`/`put` 共用 position、limit 与容量策略。

use std::rc::Rc;

use crate::{
    base::{BaseBuffer, Extent},
    config::BufferConfig,
    element::Element,
    error::{BufferError, Result, check_range},
    store::BackingStore,
    view::ByteView,
};

macro_rules! scalar_accessors {
    ($ty:ty, $get:ident, $put:ident, $get_at:ident, $put_at:ident) => {
        #[doc = concat!("相对读取一个 `", stringify!($ty), "`。")]
        pub fn $get(&mut self) -> Result<$ty> {
            self.get_scalar::<$ty>()
        }

        #[doc = concat!("相对写入一个 `", stringify!($ty), "`。")]
        pub fn $put(&mut self, value: $ty) -> Result<&mut Self> {
            self.put_scalar(value)
        }

        #[doc = concat!("在字节偏移处读取一个 `", stringify!($ty), "`。")]
        pub fn $get_at(&self, byte_offset: usize) -> Result<$ty> {
            self.get_scalar_at::<$ty>(byte_offset)
        }

        #[doc = concat!("在字节偏移处写入一个 `", stringify!($ty), "`。")]
        pub fn $put_at(&mut self, byte_offset: usize, value: $ty) -> Result<&mut Self> {
            self.put_scalar_at(byte_offset, value)
        }
    };
}

impl ByteView {
    /// 接管 `bytes` 作为存储，不复制。
    ///
    /// 新视图 `position = 0`、`limit = length = capacity = bytes.len()`。
    pub fn wrap_vec(bytes: Vec<u8>) -> Result<Self> {
        Self::wrap_vec_with(bytes, BufferConfig::default())
    }

    pub fn wrap_vec_with(bytes: Vec<u8>, config: BufferConfig) -> Result<Self> {
        let len = bytes.len();
        Self::wrap_vec_range_with(bytes, 0, len, config)
    }

    /// 接管 `bytes`，并把可读写窗口设为 `[offset, offset + len)`。
    ///
    /// # 契约说明（What）
    /// - `position = offset`、`limit = offset + len`、`capacity = bytes.len()`；
    /// - 已有内容视为已写入，`length = bytes.len()`；
    /// - 空数组返回 `EmptyBackingMemory`，区间越界返回 `IndexOutOfRange`。
    pub fn wrap_vec_range(bytes: Vec<u8>, offset: usize, len: usize) -> Result<Self> {
        Self::wrap_vec_range_with(bytes, offset, len, BufferConfig::default())
    }

    pub fn wrap_vec_range_with(
        bytes: Vec<u8>,
        offset: usize,
        len: usize,
        config: BufferConfig,
    ) -> Result<Self> {
        if bytes.is_empty() {
            return Err(BufferError::EmptyBackingMemory { op: "wrap_vec" });
        }
        let capacity = bytes.len();
        let limit = check_range("wrap_vec", offset, len, capacity)?;
        let store = BackingStore::from_vec(bytes).into_shared();
        tracing::trace!(capacity, offset, len, "byte view wraps caller memory");
        Ok(Self::from_base(BaseBuffer::from_parts(
            store,
            Extent::Whole,
            1,
            offset,
            limit,
            capacity,
            config,
        )))
    }

    /// 独占整块存储时交还全部字节；仍有其它视图共享或本视图是切片时原样返回 `Err(self)`。
    pub fn into_vec(self) -> core::result::Result<Vec<u8>, Self> {
        if self.base().is_windowed() || Rc::strong_count(self.base().store()) != 1 {
            return Err(self);
        }
        let config = self.config();
        match Rc::try_unwrap(self.into_base().into_store()) {
            Ok(cell) => Ok(cell.into_inner().into_vec()),
            Err(store) => Err(Self::from_base(BaseBuffer::over_store(store, 1, config))),
        }
    }

    /// 相对读取任意定宽元素，推进 `U::SIZE` 字节。
    pub fn get_scalar<U: Element>(&mut self) -> Result<U> {
        let start = self.base_mut().claim_read("get_scalar", U::SIZE)?;
        Ok(self.decode_scalar(start))
    }

    /// 相对写入任意定宽元素，遵循容量策略。
    pub fn put_scalar<U: Element>(&mut self, value: U) -> Result<&mut Self> {
        let start = self.base_mut().claim_write("put_scalar", U::SIZE)?;
        self.encode_scalar(start, value);
        Ok(self)
    }

    /// 在 `byte_offset` 处绝对读取，不移动 position。
    pub fn get_scalar_at<U: Element>(&self, byte_offset: usize) -> Result<U> {
        self.base()
            .check_absolute("get_scalar_at", byte_offset, U::SIZE)?;
        Ok(self.decode_scalar(byte_offset))
    }

    /// 在 `byte_offset` 处绝对写入，不移动 position，从不扩容。
    pub fn put_scalar_at<U: Element>(&mut self, byte_offset: usize, value: U) -> Result<&mut Self> {
        self.base_mut()
            .claim_absolute_write("put_scalar_at", byte_offset, U::SIZE)?;
        self.encode_scalar(byte_offset, value);
        Ok(self)
    }

    scalar_accessors!(i16, get_i16, put_i16, get_i16_at, put_i16_at);
    scalar_accessors!(i32, get_i32, put_i32, get_i32_at, put_i32_at);
    scalar_accessors!(i64, get_i64, put_i64, get_i64_at, put_i64_at);
    scalar_accessors!(f32, get_f32, put_f32, get_f32_at, put_f32_at);
    scalar_accessors!(f64, get_f64, put_f64, get_f64_at, put_f64_at);

    fn decode_scalar<U: Element>(&self, offset: usize) -> U {
        let order = self.order();
        self.base()
            .with_range(offset..offset + U::SIZE, |src| U::decode(order, src))
    }

    fn encode_scalar<U: Element>(&self, offset: usize, value: U) {
        let order = self.order();
        self.base()
            .with_range_mut(offset..offset + U::SIZE, |dst| value.encode(order, dst));
    }
}
