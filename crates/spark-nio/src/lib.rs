//! `spark-nio` 提供 NIO 风格的多类型视图缓冲。
//!
//! # 模块定位（Why）
//! - 图形与媒体编码路径常需要把同一块内存交替当作字节、short、int、float 读写，
//!   且要求显式字节序与 position/limit 游标语义；
//! - 本 crate 以一块可增长的字节存储为核心，任意数量的类型视图共享该存储，
//!   扩容或缩容后所有视图自动看到新内存，不存在悬垂引用。
//!
//! # 设计概要（How）
//! - `store` 模块的 [`BackingStore`] 基于 `bytes::BytesMut` 持有字节，经 `Rc<RefCell<_>>` 共享；
//! - `base` 模块的 [`BaseBuffer`] 以字节为单位维护 position/limit/length/mark，实现 flip、compact 等通用操作；
//! - [`TypedView<T>`] 以封闭的 [`Element`] trait 参数化，按元素宽度换算偏移并按视图字节序编解码；
//! - `cast` 模块提供同一存储上的类型转换、切片、复制，以及运行期派发的 [`AnyView`]。
//!
//! # 契约说明（What）
//! - 所有失败以 [`BufferError`] 返回，并带有稳定的 `nio.*` 错误码；失败的操作不修改任何状态；
//! - 视图为单线程对象（`!Send`），需要跨线程传递时请先 [`ByteView::into_vec`] 取回字节。
//!
//! # 使用示例
//! ```
//! use spark_nio::{BufferConfig, ByteView};
//!
//! let mut bytes = ByteView::allocate_with(8, BufferConfig::default().big_endian())?;
//! bytes.put_all(&[0x3f, 0x80, 0, 0])?;
//! let floats = bytes.as_float_view()?;
//! assert_eq!(floats.get_at(0)?, 1.0);
//! # Ok::<(), spark_nio::BufferError>(())
//! ```

mod base;
mod byte_view;
mod cast;
pub mod config;
pub mod element;
pub mod error;
pub mod order;
pub mod store;
mod view;

pub use base::BaseBuffer;
pub use cast::AnyView;
pub use config::{BufferConfig, GrowthPolicy};
pub use element::{Element, ElementKind};
pub use error::{BufferError, Result, codes};
pub use order::ByteOrder;
pub use store::{BackingStore, SharedStore};
pub use view::{ByteView, DoubleView, FloatView, IntView, LongView, ShortView, TypedView};
