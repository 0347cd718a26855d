//! 字节序描述。

use core::fmt;

/// 多字节元素编码/解码时采用的字节序。
///
/// # 契约说明（What）
/// - 字节序是**单个视图实例**的配置，不存在进程级默认值可被修改；
/// - [`ByteOrder::native`] 返回宿主机字节序，作为构造时的默认值。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    /// 宿主机字节序。
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    pub const fn is_big_endian(self) -> bool {
        matches!(self, ByteOrder::BigEndian)
    }

    /// 返回相反的字节序。
    pub const fn reversed(self) -> Self {
        match self {
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => f.write_str("BIG_ENDIAN"),
            ByteOrder::LittleEndian => f.write_str("LITTLE_ENDIAN"),
        }
    }
}
