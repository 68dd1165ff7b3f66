//! Random operation sequences checked against a `Vec` model.

use proptest::prelude::*;

use larder::ItemId;

use crate::helpers::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u32),
    Delete(usize),
    Move(u32, u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Insert),
        1 => any::<usize>().prop_map(Op::Delete),
        2 => (any::<u32>(), any::<u32>()).prop_map(|(from, to)| Op::Move(from, to)),
    ]
}

async fn check_sequence(ops: Vec<Op>) {
    let larder = test_larder();
    let list = larder.grocery_list("grocery");
    let mut model: Vec<i64> = Vec::new();
    let mut next_id = 1;

    for op in ops {
        let len = model.len() as u32;
        match op {
            Op::Insert(seed) => {
                let position = seed % (len + 1) + 1;
                list.insert(item(next_id, &format!("item-{next_id}")), position)
                    .await
                    .unwrap();
                model.insert(position as usize - 1, next_id);
                next_id += 1;
            }
            Op::Delete(seed) => {
                if model.is_empty() {
                    continue;
                }
                let id = model.remove(seed % model.len());
                list.delete(&ItemId::Int(id)).await.unwrap();
            }
            Op::Move(from, to) => {
                if len < 2 {
                    continue;
                }
                let (from, to) = (from % len + 1, to % len + 1);
                let result = list.move_item(from, to).await;
                if from == to {
                    assert!(result.unwrap_err().is_invalid_input());
                    continue;
                }
                result.unwrap();
                let id = model.remove(from as usize - 1);
                model.insert(to as usize - 1, id);
            }
        }

        let expected: Vec<ItemId> = model.iter().copied().map(ItemId::Int).collect();
        assert_eq!(ids(&list).await, expected);
        assert_dense(&larder, "grocery").await;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(op(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(check_sequence(ops));
    }
}
