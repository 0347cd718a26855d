//! `view_contract` 集成测试：聚焦类型视图的游标、容量与共享存储契约。
//!
//! # 测试总览（Why）
//! - 校验 flip/compact/resize/shrink 等状态转换后 position/limit/capacity 的取值；
//! - 覆盖越界、只读、固定容量等错误路径，确保返回的 `BufferError` 及错误码稳定；
//! - 验证同一存储上的多个视图在写入、扩容、缩容后始终观察到一致的字节。

use spark_nio::{
    BufferConfig, BufferError, ByteOrder, ByteView, FloatView, GrowthPolicy, IntView, ShortView,
    codes,
};

/// 大端写入 int 后按字节读取，再以 float 视图读取同一存储中的位模式。
#[test]
fn int_bytes_and_float_agree_over_one_store() {
    let mut bytes = ByteView::allocate_with(16, BufferConfig::default().big_endian())
        .expect("分配 16 字节");
    bytes.put_i32_at(0, 0x0102_0304).expect("写入 int");
    assert_eq!(bytes.get_at(0), Ok(0x01));
    assert_eq!(bytes.get_at(3), Ok(0x04));

    let pattern = 3.25f32.to_be_bytes();
    bytes.put_slice_at(4, &pattern).expect("写入 float 位模式");

    let floats = bytes.as_float_view().expect("16 字节可转换为 float 视图");
    assert_eq!(floats.capacity(), 4);
    assert_eq!(floats.get_at(1), Ok(3.25));
    assert_eq!(floats.order(), ByteOrder::BigEndian, "转换继承字节序");
}

/// 读取 4 字节后 compact，未读的 `[6, 10)` 应搬到开头。
#[test]
fn compact_moves_unread_bytes_to_front() {
    let mut view = ByteView::allocate(16).expect("分配");
    let written: Vec<u8> = (10..20).collect();
    view.put_all(&written).expect("写入 10 字节");
    view.set_limit(10)
        .and_then(|v| v.set_position(6))
        .expect("游标合法");

    view.compact().expect("compact");
    assert_eq!(view.position(), 4);
    assert_eq!(view.limit(), view.capacity());
    let mut head = [0u8; 4];
    view.get_slice_at(0, &mut head).expect("读取开头");
    assert_eq!(head, [16, 17, 18, 19]);
}

/// 任意写入后 flip：`limit` 等于写入量、`position` 归零。
#[test]
fn flip_prepares_written_prefix_for_reading() {
    let mut view = ShortView::allocate(8).expect("分配");
    view.put_all(&[1, 2, 3]).expect("写入");
    view.flip();
    assert_eq!((view.position(), view.limit()), (0, 3));
    let mut out = [0i16; 3];
    view.get_into(&mut out).expect("读取");
    assert_eq!(out, [1, 2, 3]);
}

/// 扩容后原有内容保持不变，新增区域为零。
#[test]
fn resize_preserves_existing_elements() {
    let mut view = IntView::wrap(&[7, 8, 9]).expect("包装");
    view.resize(5).expect("扩容");
    assert_eq!(view.capacity(), 5, "5 字节向上取整为 8 字节");
    assert_eq!(view.limit(), 5, "limit 原本等于容量，随之增长");
    assert_eq!(view.to_vec(), vec![7, 8, 9, 0, 0]);
}

/// limit 小于容量时扩容不会移动 limit。
#[test]
fn resize_keeps_explicit_limit() {
    let mut view = IntView::allocate(4).expect("分配");
    view.set_limit(2).expect("limit 合法");
    view.resize(16).expect("扩容");
    assert_eq!(view.capacity(), 8);
    assert_eq!(view.limit(), 2);
    assert!(view.resize(0).is_ok(), "零扩容为空操作");
    assert_eq!(view.capacity(), 8);
}

/// 扩容后兄弟视图立即看到新的容量与原有数据。
#[test]
fn growth_is_visible_through_every_view() {
    let mut bytes = ByteView::allocate_with(4, BufferConfig::default().little_endian())
        .expect("分配");
    let ints = bytes.as_int_view().expect("转换");
    bytes.put_all(&[1, 0, 0, 0, 2, 0, 0, 0]).expect("自动扩容写入");
    assert_eq!(bytes.capacity(), 8);
    assert_eq!(ints.capacity(), 2);
    assert_eq!(ints.get_at(1), Ok(2));
}

/// 缩容到 limit 后兄弟视图的游标被夹回新边界。
#[test]
fn shrink_clamps_sibling_cursors() {
    let mut owner = ByteView::allocate(16).expect("分配");
    owner.put_all(&[5; 12]).expect("写入");
    let mut sibling = owner.duplicate();
    owner.flip();
    owner.set_limit(6).expect("limit 合法");
    owner.shrink().expect("缩容");

    assert_eq!(owner.capacity(), 6);
    assert_eq!(sibling.capacity(), 6);
    assert_eq!(sibling.position(), 6);
    assert_eq!(sibling.length(), 6);
    assert!(sibling.put(1).is_ok(), "兄弟视图仍可按策略继续写入");
}

/// 兄弟视图把存储缩容到窗口起点之前：窗口容量归零，所有操作返回错误或空结果。
#[test]
fn window_beyond_shrunk_store_degrades_to_empty() {
    let mut owner = ByteView::allocate(16).expect("分配");
    let mut window = owner.slice_range(10, 12).expect("切片");
    let mut straddling = owner.slice_range(2, 5).expect("切片");
    let mut ints = owner.as_int_view().expect("转换").slice_range(3, 3).expect("切片");
    owner.set_limit(4).expect("limit 合法");
    owner.shrink().expect("缩容");

    assert_eq!(window.capacity(), 0);
    assert_eq!(window.to_vec(), Vec::<u8>::new());
    assert_eq!(window.with_bytes(|bytes| bytes.len()), 0);
    window.clear().expect("空窗口清空为空操作");
    window.get_into(&mut []).expect("零长度读取");
    assert_eq!(window.copy().capacity(), 0);
    assert_eq!(
        window.get().map_err(|err| err.code()),
        Err(codes::INDEX_OUT_OF_RANGE)
    );
    assert_eq!(
        window.put(1).map(|_| ()).map_err(|err| err.code()),
        Err(codes::BUFFER_OVERFLOW)
    );

    ints.get_into(&mut []).expect("零长度读取");
    assert_eq!(ints.to_vec(), Vec::<i32>::new());

    assert_eq!(straddling.capacity(), 2, "窗口只保留存储内的部分");
    straddling.put_at(1, 7).expect("窗口内写入");
    assert_eq!(owner.get_at(3), Ok(7));
    assert!(straddling.put_at(2, 7).is_err());
}

/// 兄弟视图扩容后窗口仍固定在原区间，并继续与新存储共享字节。
#[test]
fn window_survives_sibling_growth() {
    let mut owner = ByteView::allocate(8).expect("分配");
    let mut window = owner.slice_range(2, 5).expect("切片");
    owner.put_all(&[1; 12]).expect("自动扩容写入");
    assert_eq!(owner.capacity(), 16);

    assert_eq!(window.capacity(), 4);
    assert_eq!(window.to_vec(), vec![1, 1, 1, 1]);
    window.put_at(0, 9).expect("窗口内写入");
    assert_eq!(owner.get_at(2), Ok(9));
    owner.put_at(5, 8).expect("写入");
    assert_eq!(window.get_at(3), Ok(8));
}

/// 绝对访问越过容量时返回稳定错误码，且从不扩容。
#[test]
fn absolute_access_beyond_capacity_is_rejected() {
    let mut view = FloatView::allocate(2).expect("分配");
    let err = view.put_at(2, 1.0).expect_err("越界写入");
    assert_eq!(err.code(), codes::INDEX_OUT_OF_RANGE);
    assert_eq!(view.capacity(), 2);
    assert_eq!(
        view.get_at(5).map_err(|err| err.code()),
        Err(codes::INDEX_OUT_OF_RANGE)
    );
}

/// 固定容量视图以 limit 为界，越界返回 `BufferOverflow`。
#[test]
fn fixed_view_overflows_instead_of_growing() {
    let config = BufferConfig::default().with_growth(GrowthPolicy::Fixed);
    let mut view = IntView::allocate_with(2, config).expect("分配");
    view.put(1).and_then(|v| v.put(2)).expect("写满");
    let err = view.put(3).expect_err("超过 limit");
    assert_eq!(
        err,
        BufferError::BufferOverflow {
            op: "put",
            required: 4,
            limit: 8
        }
    );
    assert_eq!(err.code(), codes::BUFFER_OVERFLOW);
    assert_eq!(view.capacity(), 2);
}

/// 只读副本共享字节但拒绝写入。
#[test]
fn read_only_view_observes_but_never_writes() {
    let mut view = ByteView::wrap_vec(vec![1, 2, 3]).expect("包装");
    let mut read_only = view.as_read_only();
    view.put_at(0, 9).expect("原视图可写");
    assert_eq!(read_only.get_at(0), Ok(9));
    let err = read_only.put(0).expect_err("只读");
    assert_eq!(err.code(), codes::READ_ONLY_VIOLATION);
    assert!(read_only.clear().is_err());
    assert!(read_only.shrink().is_err());
}

/// clear 清零全部字节并复位游标。
#[test]
fn clear_zeroes_store_and_resets_cursor() {
    let mut view = ShortView::wrap(&[1, 2, 3]).expect("包装");
    view.set_position(2).expect("position 合法").mark();
    view.clear().expect("清空");
    assert_eq!((view.position(), view.limit(), view.length()), (0, 3, 0));
    assert_eq!(view.to_vec(), vec![0, 0, 0]);
    assert_eq!(
        view.reset().map(|_| ()).map_err(|err| err.code()),
        Err(codes::INVALID_OPERATION)
    );
}

/// mark/reset 在 position 上往返。
#[test]
fn mark_and_reset_restore_position() {
    let mut view = IntView::wrap(&[1, 2, 3, 4]).expect("包装");
    view.get().expect("读取");
    view.mark();
    view.get().and_then(|_| view.get()).expect("读取");
    view.reset().expect("回到 mark");
    assert_eq!(view.get(), Ok(2));
}

/// 空输入不能作为存储。
#[test]
fn empty_inputs_are_rejected() {
    assert_eq!(
        ByteView::wrap_vec(Vec::new()).map(|_| ()).map_err(|err| err.code()),
        Err(codes::EMPTY_BACKING_MEMORY)
    );
    assert_eq!(
        FloatView::wrap(&[]).map(|_| ()).map_err(|err| err.code()),
        Err(codes::EMPTY_BACKING_MEMORY)
    );
}

/// 向外交还字节：独占时成功，且携带写入内容。
#[test]
fn into_vec_hands_back_written_bytes() {
    let mut view = ByteView::allocate(4).expect("分配");
    view.put_all(&[1, 2, 3, 4]).expect("写入");
    assert_eq!(view.into_vec().ok(), Some(vec![1, 2, 3, 4]));
}
