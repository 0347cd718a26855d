//! 定宽原始类型的编解码契约。
//!
//! # 设计背景（Why）
//! - 各类型视图（byte/short/int/float/long/double）的差异只在“元素宽度”与“字节 <-> 值”的转换，
//!   其余游标逻辑完全一致；以封闭 trait 参数化视图，可避免为每种元素复制一份缓冲实现。
//! - trait 通过私有 `sealed` 模块封闭，外部无法为任意类型实现，从而保证所有元素都是
//!   无填充、无不变量的定宽原始值。
//!
//! # 契约说明（What）
//! - `encode` 写入恰好 [`Element::SIZE`] 个字节；`decode` 读取恰好 `SIZE` 个字节；
//! - 浮点数按 IEEE-754 位模式原样编码，不做 NaN 规范化；有符号整数为二进制补码。

use core::fmt;

use crate::order::ByteOrder;

mod sealed {
    pub trait Sealed {}
}

/// 元素种类的封闭集合，供运行期按种类派发视图。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Byte,
    Short,
    Int,
    Float,
    Long,
    Double,
}

impl ElementKind {
    /// 元素宽度（字节）。
    pub const fn size(self) -> usize {
        match self {
            ElementKind::Byte => 1,
            ElementKind::Short => 2,
            ElementKind::Int | ElementKind::Float => 4,
            ElementKind::Long | ElementKind::Double => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Byte => "byte",
            ElementKind::Short => "short",
            ElementKind::Int => "int",
            ElementKind::Float => "float",
            ElementKind::Long => "long",
            ElementKind::Double => "double",
        }
    }

    /// 对应视图类型的名称，用于 `Display` 输出。
    pub const fn view_name(self) -> &'static str {
        match self {
            ElementKind::Byte => "ByteView",
            ElementKind::Short => "ShortView",
            ElementKind::Int => "IntView",
            ElementKind::Float => "FloatView",
            ElementKind::Long => "LongView",
            ElementKind::Double => "DoubleView",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 可被视图读写的定宽原始类型。
///
/// # 教案式说明
/// - **意图 (Why)**：把“宽度 + 编解码”收敛为一个关联常量与两个函数，
///   视图层只做偏移换算与边界检查。
/// - **契约 (What)**：
///   - `dst.len() >= SIZE`、`src.len() >= SIZE` 由调用方（视图层）在边界检查后保证；
///   - `decode(order, encode(v, order))` 必须逐位等于 `v`。
pub trait Element: sealed::Sealed + Copy + PartialEq + fmt::Debug + Default + 'static {
    /// 元素宽度（字节）。
    const SIZE: usize;
    /// 元素种类标签。
    const KIND: ElementKind;

    /// 按 `order` 将值写入 `dst[..SIZE]`。
    fn encode(self, order: ByteOrder, dst: &mut [u8]);

    /// 按 `order` 从 `src[..SIZE]` 解码。
    fn decode(order: ByteOrder, src: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $kind:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();
            const KIND: ElementKind = ElementKind::$kind;

            #[inline]
            fn encode(self, order: ByteOrder, dst: &mut [u8]) {
                let raw = match order {
                    ByteOrder::BigEndian => self.to_be_bytes(),
                    ByteOrder::LittleEndian => self.to_le_bytes(),
                };
                dst[..Self::SIZE].copy_from_slice(&raw);
            }

            #[inline]
            fn decode(order: ByteOrder, src: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$ty>()];
                raw.copy_from_slice(&src[..Self::SIZE]);
                match order {
                    ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                }
            }
        }
    };
}

impl_element!(u8, Byte);
impl_element!(i16, Short);
impl_element!(i32, Int);
impl_element!(f32, Float);
impl_element!(i64, Long);
impl_element!(f64, Double);
