//! Property 2 / scenario S6 — every payload gets exactly one final
//! release. Checked directly against `Arc::strong_count`, in the style of
//! the SPMC slot this crate is descended from.

use rcu_cell::RcuCell;
use std::sync::Arc;

#[test]
fn no_leak() {
    let vals = [Arc::new(1), Arc::new(2), Arc::new(3)];

    {
        let cell = RcuCell::new(vals[0].clone());

        let g1 = cell.read();
        cell.update(vals[1].clone());
        assert_eq!(
            vals.iter().map(Arc::strong_count).collect::<Vec<_>>(),
            [2, 2, 1]
        );
        assert_eq!(**g1, 1);
        g1.release();

        let g2 = cell.read();
        cell.update(vals[2].clone());
        assert_eq!(
            vals.iter().map(Arc::strong_count).collect::<Vec<_>>(),
            [2, 2, 2]
        );
        assert_eq!(**g2, 2);
        g2.release();

        cell.dispose();
    }

    assert_eq!(
        vals.iter().map(Arc::strong_count).collect::<Vec<_>>(),
        [1, 1, 1]
    );
}
