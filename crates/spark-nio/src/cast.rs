//! 视图工厂：同一存储上的类型转换、切片、复制与运行期派发。
//!
//! # 模块定位（Why）
//! - 同一块字节经常需要被“先当字节写、再当 float 读”，或把 `[position, limit)`
//!   零拷贝地交给下游；这些操作只产生新的游标，不复制字节；
//! - 元素类型在编译期由 [`Element`] 决定，运行期按种类选择视图时使用封闭枚举 [`AnyView`]，
//!   不依赖反射或动态类型。
//!
//! # 契约说明（What）
//! - `as_view`/`slice`/`duplicate`/`as_read_only` 与源视图共享存储，任一视图的写入立即对其它视图可见；
//! - `copy` 产生独立存储，之后两者互不影响；
//! - 新视图继承源视图的字节序、只读标记与容量策略，游标互相独立。

use crate::{
    base::{BaseBuffer, Extent},
    element::{Element, ElementKind},
    error::{BufferError, Result, element_offset},
    store::BackingStore,
    view::{ByteView, DoubleView, FloatView, IntView, LongView, ShortView, TypedView},
};

impl<T: Element> TypedView<T> {
    /// 以元素 `U` 重新解释同一存储。
    ///
    /// # 契约说明（What）
    /// - 覆盖范围与源视图相同（整块存储或同一窗口）；
    /// - position/limit 按 `U::SIZE` 向下对齐，length 原样继承；
    /// - `length` 或字节容量不是 `U::SIZE` 的整数倍时返回 `InvalidViewCast`。
    pub fn as_view<U: Element>(&self) -> Result<TypedView<U>> {
        let base = self.base();
        let length = base.byte_length();
        let capacity = base.byte_capacity();
        for byte_len in [length, capacity] {
            if byte_len % U::SIZE != 0 {
                return Err(BufferError::InvalidViewCast {
                    byte_len,
                    element: U::KIND.name(),
                    element_size: U::SIZE,
                });
            }
        }
        let position = base.byte_position() / U::SIZE * U::SIZE;
        let limit = base.byte_limit() / U::SIZE * U::SIZE;
        tracing::trace!(
            from = T::KIND.name(),
            to = U::KIND.name(),
            capacity,
            "view cast over shared store"
        );
        Ok(TypedView::from_base(BaseBuffer::from_parts(
            base.store().clone(),
            base.extent(),
            U::SIZE,
            position,
            limit,
            length,
            base.config(),
        )))
    }

    pub fn as_byte_view(&self) -> Result<ByteView> {
        self.as_view()
    }

    pub fn as_short_view(&self) -> Result<ShortView> {
        self.as_view()
    }

    pub fn as_int_view(&self) -> Result<IntView> {
        self.as_view()
    }

    pub fn as_float_view(&self) -> Result<FloatView> {
        self.as_view()
    }

    pub fn as_long_view(&self) -> Result<LongView> {
        self.as_view()
    }

    pub fn as_double_view(&self) -> Result<DoubleView> {
        self.as_view()
    }

    /// 按运行期种类转换视图。
    pub fn as_kind(&self, kind: ElementKind) -> Result<AnyView> {
        Ok(match kind {
            ElementKind::Byte => AnyView::Byte(self.as_view()?),
            ElementKind::Short => AnyView::Short(self.as_view()?),
            ElementKind::Int => AnyView::Int(self.as_view()?),
            ElementKind::Float => AnyView::Float(self.as_view()?),
            ElementKind::Long => AnyView::Long(self.as_view()?),
            ElementKind::Double => AnyView::Double(self.as_view()?),
        })
    }

    /// 以 `[position, limit)` 为窗口的零拷贝切片。
    ///
    /// 新视图 `position = 0`、`limit = capacity = remaining()`，
    /// length 为源 length 落在窗口内的部分。窗口固定，不能扩缩容。
    pub fn slice(&self) -> TypedView<T> {
        let base = self.base();
        let start = base.byte_position();
        let len = base.byte_limit() - start;
        let length = base.byte_length().saturating_sub(start).min(len);
        self.window(start, len, length)
    }

    /// 以绝对元素区间 `[from, to]`（`to` 含）为窗口的零拷贝切片。
    ///
    /// # 契约说明（What）
    /// - `from > to` 返回 `InvalidArgument`；
    /// - `(to + 1) * SIZE` 超过字节容量返回 `IndexOutOfRange`。
    pub fn slice_range(&self, from: usize, to: usize) -> Result<TypedView<T>> {
        if from > to {
            return Err(BufferError::invalid_argument(
                "slice_range",
                format!("from {from} is greater than to {to}"),
            ));
        }
        let base = self.base();
        let capacity = base.byte_capacity();
        let start = element_offset("slice_range", from, T::SIZE, capacity)?;
        let end = to
            .checked_add(1)
            .and_then(|count| count.checked_mul(T::SIZE))
            .ok_or_else(|| BufferError::out_of_range("slice_range", start, usize::MAX, capacity))?;
        if end > capacity {
            return Err(BufferError::out_of_range(
                "slice_range",
                start,
                end - start,
                capacity,
            ));
        }
        let len = end - start;
        let length = base.byte_length().saturating_sub(start).min(len);
        Ok(self.window(start, len, length))
    }

    /// 共享存储与覆盖范围、复制游标的新视图（mark 不复制）。
    pub fn duplicate(&self) -> TypedView<T> {
        let base = self.base();
        TypedView::from_base(BaseBuffer::from_parts(
            base.store().clone(),
            base.extent(),
            T::SIZE,
            base.byte_position(),
            base.byte_limit(),
            base.byte_length(),
            base.config(),
        ))
    }

    /// 共享存储的只读副本。
    pub fn as_read_only(&self) -> TypedView<T> {
        let mut view = self.duplicate();
        let config = view.config().read_only(true);
        view.base_mut().set_config(config);
        view
    }

    /// 复制本视图覆盖的全部字节到一块独立存储，游标与配置一并复制。
    pub fn copy(&self) -> TypedView<T> {
        let base = self.base();
        let capacity = base.byte_capacity();
        let store = match base.extent() {
            Extent::Whole => base.store().borrow().deep_copy(),
            Extent::Window { .. } => {
                BackingStore::from_vec(base.with_range(0..capacity, |bytes| bytes.to_vec()))
            }
        };
        TypedView::from_base(BaseBuffer::from_parts(
            store.into_shared(),
            Extent::Whole,
            T::SIZE,
            base.byte_position(),
            base.byte_limit(),
            base.byte_length(),
            base.config(),
        ))
    }

    /// 包装为运行期派发的枚举。
    pub fn into_any(self) -> AnyView {
        AnyView::from_typed(self)
    }

    fn window(&self, start: usize, len: usize, length: usize) -> TypedView<T> {
        let base = self.base();
        tracing::trace!(
            element = T::KIND.name(),
            offset = base.origin() + start,
            len,
            "view sliced"
        );
        TypedView::from_base(BaseBuffer::from_parts(
            base.store().clone(),
            Extent::Window {
                offset: base.origin() + start,
                len,
            },
            T::SIZE,
            0,
            len,
            length,
            base.config(),
        ))
    }
}

/// 运行期按元素种类派发的视图。
///
/// - **意图 (Why)**：资源描述等数据驱动场景只在运行期知道元素类型；
/// - **契约 (What)**：变体集合封闭，与 [`ElementKind`] 一一对应；类型相关的读写请先
///   通过 `match` 取回具体视图。
#[derive(Debug)]
pub enum AnyView {
    Byte(ByteView),
    Short(ShortView),
    Int(IntView),
    Float(FloatView),
    Long(LongView),
    Double(DoubleView),
}

macro_rules! dispatch {
    ($self:expr, $view:ident => $body:expr) => {
        match $self {
            AnyView::Byte($view) => $body,
            AnyView::Short($view) => $body,
            AnyView::Int($view) => $body,
            AnyView::Float($view) => $body,
            AnyView::Long($view) => $body,
            AnyView::Double($view) => $body,
        }
    };
}

impl AnyView {
    /// 游标与 mark 原样保留。
    fn from_typed<T: Element>(view: TypedView<T>) -> Self {
        match T::KIND {
            ElementKind::Byte => AnyView::Byte(view.retype()),
            ElementKind::Short => AnyView::Short(view.retype()),
            ElementKind::Int => AnyView::Int(view.retype()),
            ElementKind::Float => AnyView::Float(view.retype()),
            ElementKind::Long => AnyView::Long(view.retype()),
            ElementKind::Double => AnyView::Double(view.retype()),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            AnyView::Byte(_) => ElementKind::Byte,
            AnyView::Short(_) => ElementKind::Short,
            AnyView::Int(_) => ElementKind::Int,
            AnyView::Float(_) => ElementKind::Float,
            AnyView::Long(_) => ElementKind::Long,
            AnyView::Double(_) => ElementKind::Double,
        }
    }

    pub fn base(&self) -> &BaseBuffer {
        dispatch!(self, view => view.base())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, view => view.capacity())
    }

    pub fn position(&self) -> usize {
        dispatch!(self, view => view.position())
    }

    pub fn limit(&self) -> usize {
        dispatch!(self, view => view.limit())
    }

    pub fn remaining(&self) -> usize {
        dispatch!(self, view => view.remaining())
    }

    pub fn flip(&mut self) {
        dispatch!(self, view => { view.flip(); })
    }

    pub fn rewind(&mut self) {
        dispatch!(self, view => { view.rewind(); })
    }

    pub fn clear(&mut self) -> Result<()> {
        dispatch!(self, view => view.clear().map(|_| ()))
    }

    /// 转换为另一种元素的视图，规则同 [`TypedView::as_view`]。
    pub fn as_kind(&self, kind: ElementKind) -> Result<AnyView> {
        dispatch!(self, view => view.as_kind(kind))
    }
}
