//! 类型视图性质验证
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：对任意元素序列与任意字节序，验证“写入 -> flip -> 读取”逐位还原，
//!   以及任意“写/读/flip/compact”操作序列之后游标不变量始终成立；
//! - **设计手法 (How)**：使用 Proptest 生成输入，把 `Vec` 作为影子模型与视图逐步对照，
//!   失败时由 Proptest 自动收缩到最小反例。
//!
//! # 合同与边界 (What)
//!
//! - 浮点比较一律使用 `to_bits`，NaN 载荷也必须原样保留；
//! - 操作序列分别在 `Fixed` 与 `Growable` 两种容量策略下运行，影子模型同步模拟溢出与扩容。

use proptest::prelude::*;
use spark_nio::{
    BufferConfig, ByteOrder, ByteView, DoubleView, FloatView, GrowthPolicy, IntView, LongView,
    ShortView,
};

fn any_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::BigEndian), Just(ByteOrder::LittleEndian)]
}

macro_rules! roundtrip_property {
    ($name:ident, $view:ty, $elem:ty, $bits:expr) => {
        proptest! {
            #[test]
            fn $name(values in proptest::collection::vec(any::<$elem>(), 1..64), order in any_order()) {
                let config = BufferConfig::default().with_order(order);
                let mut view = <$view>::allocate_with(1, config).expect("分配");
                view.put_all(&values).expect("可增长视图写入");
                view.flip();
                prop_assert_eq!(view.remaining(), values.len());
                let mut out = vec![<$elem>::default(); values.len()];
                view.get_into(&mut out).expect("读取");
                let bits = $bits;
                prop_assert_eq!(
                    out.iter().map(bits).collect::<Vec<_>>(),
                    values.iter().map(bits).collect::<Vec<_>>()
                );
            }
        }
    };
}

roundtrip_property!(short_roundtrip_is_exact, ShortView, i16, |v: &i16| *v);
roundtrip_property!(int_roundtrip_is_exact, IntView, i32, |v: &i32| *v);
roundtrip_property!(long_roundtrip_is_exact, LongView, i64, |v: &i64| *v);
roundtrip_property!(float_roundtrip_is_bit_exact, FloatView, f32, |v: &f32| v.to_bits());
roundtrip_property!(double_roundtrip_is_bit_exact, DoubleView, f64, |v: &f64| v.to_bits());

proptest! {
    /// 以一种字节序写入、以另一种读取，结果等于字节反转。
    #[test]
    fn opposite_order_reads_swapped_bytes(value in any::<i32>(), order in any_order()) {
        let mut view = IntView::allocate_with(1, BufferConfig::default().with_order(order))
            .expect("分配");
        view.put_at(0, value).expect("写入");
        view.set_order(order.reversed());
        prop_assert_eq!(view.get_at(0), Ok(value.swap_bytes()));
    }
}

/// 影子模型的一步操作。
#[derive(Clone, Debug)]
enum Op {
    Put(u8),
    Get,
    Flip,
    Rewind,
    Compact,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u8>().prop_map(Op::Put),
        3 => Just(Op::Get),
        1 => Just(Op::Flip),
        1 => Just(Op::Rewind),
        1 => Just(Op::Compact),
    ]
}

/// 以影子模型驱动视图并逐步比对游标与读出的字节。
///
/// - `Fixed`：写入以 limit 为界，越界失败且不改变状态；
/// - `Growable`：写入以容量为界，不足时按 `max(缺口, 容量)` 扩容；扩容前 limit 等于容量时
///   limit 跟随新容量，写入终点超过 limit 时再推进到终点。
fn check_sequence(policy: GrowthPolicy, capacity: usize, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let config = BufferConfig::default().with_growth(policy);
    let mut view = ByteView::allocate_with(capacity, config).expect("分配");
    let mut shadow = vec![0u8; capacity];
    let mut capacity = capacity;
    let (mut position, mut limit) = (0usize, capacity);

    for op in ops {
        match op {
            Op::Put(byte) => {
                let result = view.put(byte).map(|_| ());
                match policy {
                    GrowthPolicy::Fixed => {
                        if position < limit {
                            prop_assert!(result.is_ok());
                            shadow[position] = byte;
                            position += 1;
                        } else {
                            prop_assert!(result.is_err());
                        }
                    }
                    GrowthPolicy::Growable => {
                        prop_assert!(result.is_ok());
                        let end = position + 1;
                        if end > capacity {
                            let extra = (end - capacity).max(capacity);
                            if limit == capacity {
                                limit += extra;
                            }
                            capacity += extra;
                            shadow.resize(capacity, 0);
                        }
                        limit = limit.max(end);
                        shadow[position] = byte;
                        position = end;
                    }
                }
            }
            Op::Get => {
                let result = view.get();
                if position < limit {
                    prop_assert_eq!(result, Ok(shadow[position]));
                    position += 1;
                } else {
                    prop_assert!(result.is_err());
                }
            }
            Op::Flip => {
                view.flip();
                limit = position;
                position = 0;
            }
            Op::Rewind => {
                view.rewind();
                position = 0;
            }
            Op::Compact => {
                view.compact().expect("可写视图");
                shadow.copy_within(position..limit, 0);
                position = limit - position;
                limit = capacity;
            }
        }
        prop_assert_eq!(view.position(), position);
        prop_assert_eq!(view.limit(), limit);
        prop_assert!(view.position() <= view.limit());
        prop_assert!(view.limit() <= view.capacity());
        prop_assert_eq!(view.capacity(), capacity);
    }
    Ok(())
}

proptest! {
    /// 固定容量：任意操作序列后 `position <= limit <= capacity`，读出的字节与影子模型一致。
    #[test]
    fn fixed_cursor_invariants_hold_for_any_sequence(
        capacity in 1usize..32,
        ops in proptest::collection::vec(op_strategy(), 0..128),
    ) {
        check_sequence(GrowthPolicy::Fixed, capacity, ops)?;
    }

    /// 可增长：相对写入从不失败，容量与 limit 按扩容规则变化。
    #[test]
    fn growable_cursor_invariants_hold_for_any_sequence(
        capacity in 1usize..32,
        ops in proptest::collection::vec(op_strategy(), 0..128),
    ) {
        check_sequence(GrowthPolicy::Growable, capacity, ops)?;
    }
}
