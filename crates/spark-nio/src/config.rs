//! 视图构造期配置。
//!
//! # 设计背景（Why）
//! - 字节序、只读、直接内存与容量策略都属于“构造时决定、运行期极少变化”的配置，
//!   集中在一个值类型中，避免构造函数参数爆炸；
//! - 开启 `serde` 特性后可直接从上层配置文件反序列化，与 `spark-core` 配置类型的做法一致。
//!
//! # 契约说明（What）
//! - [`BufferConfig::default`]：宿主字节序、可写、非直接内存、[`GrowthPolicy::Growable`]；
//! - 所有 builder 方法按值消费并返回新配置，不存在共享可变状态。

use crate::order::ByteOrder;

/// 相对写入遇到容量不足时的处理策略。
///
/// - `Growable`：相对写入以容量为界，必要时自动扩容并推进 `limit`；
/// - `Fixed`：相对写入以 `limit` 为界，越界返回 `BufferOverflow`。
///
/// 绝对写入（`put_at` 等）在两种策略下都不会扩容。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GrowthPolicy {
    #[default]
    Growable,
    Fixed,
}

/// 视图配置。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    pub order: ByteOrder,
    pub read_only: bool,
    /// 仅作为标记保留；Rust 侧不区分托管与非托管内存，两者分配方式相同。
    pub direct: bool,
    pub growth: GrowthPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            order: ByteOrder::native(),
            read_only: false,
            direct: false,
            growth: GrowthPolicy::Growable,
        }
    }
}

impl BufferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定容量的配置快捷方式。
    pub fn fixed() -> Self {
        Self::default().with_growth(GrowthPolicy::Fixed)
    }

    pub fn with_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    pub fn big_endian(self) -> Self {
        self.with_order(ByteOrder::BigEndian)
    }

    pub fn little_endian(self) -> Self {
        self.with_order(ByteOrder::LittleEndian)
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn direct(mut self, direct: bool) -> Self {
        self.direct = direct;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}
