//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中声明视图缓冲在越界、只读写入、视图转换失败等场景下的错误语义；
//! - 所有错误均属于“调用契约被破坏”，不可重试，调用方应在热点路径前自行校验。
//!
//! ## 设计要求（What）
//! - 使用 `thiserror::Error` 派生，兼容 `std::error::Error` 生态；
//! - 每个变体都携带失败的操作名与相关数值，便于日志直接定位；
//! - 通过 [`BufferError::code`] 暴露 `nio.<语义>` 形式的稳定错误码，与工作区其余 crate 的错误码约定保持一致。
//!
//! ## 原子性（How）
//! - 所有边界检查都在写入前完成，返回错误时缓冲状态与底层字节保持调用前的样子。

use thiserror::Error;

/// 本 crate 的统一结果别名。
pub type Result<T, E = BufferError> = core::result::Result<T, E>;

/// 稳定错误码常量。
///
/// - **意图 (Why)**：日志与告警系统依赖稳定字符串而非 `Display` 文案做聚合；
/// - **契约 (What)**：码值一经发布不得修改，新增变体需同步追加常量。
pub mod codes {
    pub const INDEX_OUT_OF_RANGE: &str = "nio.index_out_of_range";
    pub const BUFFER_OVERFLOW: &str = "nio.buffer_overflow";
    pub const READ_ONLY_VIOLATION: &str = "nio.read_only_violation";
    pub const INVALID_VIEW_CAST: &str = "nio.invalid_view_cast";
    pub const INVALID_ARGUMENT: &str = "nio.invalid_argument";
    pub const EMPTY_BACKING_MEMORY: &str = "nio.empty_backing_memory";
    pub const INVALID_OPERATION: &str = "nio.invalid_operation";
}

/// 视图缓冲错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把位置/容量越界、策略性溢出、只读冲突与视图转换失败区分开，
///   调用方可以按变体决定是扩容、翻转还是直接放弃。
/// - **契约 (What)**：
///   - 数值字段一律以**字节**为单位，避免不同元素宽度的视图之间产生歧义；
///   - `op` 为触发错误的公开方法名，例如 `"put_at"`；
///   - 变体均为 `Clone + Eq`，测试可直接做等值断言。
/// - **设计权衡 (Trade-offs)**：`InvalidArgument` 使用 `String` 保存细节，牺牲一次堆分配换取可读性；
///   其余变体保持零分配。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BufferError {
    /// 读写区间 `[offset, offset + len)` 超出了允许的上界 `bound`。
    #[error("{op}: range [{offset}, {offset}+{len}) exceeds bound {bound}")]
    IndexOutOfRange {
        op: &'static str,
        offset: usize,
        len: usize,
        bound: usize,
    },

    /// 固定容量策略下，相对写入需要 `required` 字节但 `limit` 不足。
    #[error("{op}: write of {required} bytes overflows limit {limit}")]
    BufferOverflow {
        op: &'static str,
        required: usize,
        limit: usize,
    },

    /// 对只读视图执行了写入或会改写字节的操作。
    #[error("{op}: buffer is read-only")]
    ReadOnlyViolation { op: &'static str },

    /// 字节长度不是目标元素宽度的整数倍，无法转换视图。
    #[error("cannot view {byte_len} bytes as {element} (element size {element_size})")]
    InvalidViewCast {
        byte_len: usize,
        element: &'static str,
        element_size: usize,
    },

    /// 参数不满足前置条件，例如 `from > to` 或游标次序被破坏。
    #[error("{op}: invalid argument: {detail}")]
    InvalidArgument { op: &'static str, detail: String },

    /// 使用零长度内存包装缓冲。
    #[error("{op}: backing memory is empty")]
    EmptyBackingMemory { op: &'static str },

    /// 当前状态下不允许执行该操作，例如未设置 mark 就调用 `reset`。
    #[error("{op}: {detail}")]
    InvalidOperation {
        op: &'static str,
        detail: &'static str,
    },
}

impl BufferError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::IndexOutOfRange { .. } => codes::INDEX_OUT_OF_RANGE,
            BufferError::BufferOverflow { .. } => codes::BUFFER_OVERFLOW,
            BufferError::ReadOnlyViolation { .. } => codes::READ_ONLY_VIOLATION,
            BufferError::InvalidViewCast { .. } => codes::INVALID_VIEW_CAST,
            BufferError::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            BufferError::EmptyBackingMemory { .. } => codes::EMPTY_BACKING_MEMORY,
            BufferError::InvalidOperation { .. } => codes::INVALID_OPERATION,
        }
    }

    pub(crate) fn out_of_range(op: &'static str, offset: usize, len: usize, bound: usize) -> Self {
        BufferError::IndexOutOfRange {
            op,
            offset,
            len,
            bound,
        }
    }

    pub(crate) fn invalid_argument(op: &'static str, detail: impl Into<String>) -> Self {
        BufferError::InvalidArgument {
            op,
            detail: detail.into(),
        }
    }
}

/// 校验 `[offset, offset + len)` 落在 `[0, bound)` 内，并处理乘法/加法溢出。
///
/// 溢出本身也视为越界：调用方传入的索引无论如何都无法寻址。
pub(crate) fn check_range(
    op: &'static str,
    offset: usize,
    len: usize,
    bound: usize,
) -> Result<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= bound => Ok(end),
        _ => Err(BufferError::out_of_range(op, offset, len, bound)),
    }
}

/// 将元素索引换算为字节偏移；溢出时返回 `IndexOutOfRange`。
pub(crate) fn element_offset(
    op: &'static str,
    index: usize,
    element_size: usize,
    bound: usize,
) -> Result<usize> {
    index
        .checked_mul(element_size)
        .ok_or_else(|| BufferError::out_of_range(op, usize::MAX, element_size, bound))
}
