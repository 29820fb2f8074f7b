//! Property tests for the equivalence store.
//!
//! Random sequences of unions over `0`, `1`, `x`, `1 - x` and `x*y` are checked against
//! the {0,1} models of the equalities they were built from.

use proptest::prelude::*;

use binpoly::equivalence::EquivalenceStore;
use binpoly::poly::Poly;
use binpoly::types::Var;

const NUM_VARS: u32 = 3;

/// Node description, turned into a [`Poly`] by [`poly`].
#[derive(Debug, Clone)]
enum Node {
    Zero,
    One,
    Var(u32),
    NotVar(u32),
    Product(u32, u32),
}

fn arb_node() -> impl Strategy<Value = Node> {
    prop_oneof![
        1 => Just(Node::Zero),
        1 => Just(Node::One),
        4 => (1..=NUM_VARS).prop_map(Node::Var),
        3 => (1..=NUM_VARS).prop_map(Node::NotVar),
        2 => (1..=NUM_VARS, 1..=NUM_VARS).prop_map(|(i, j)| Node::Product(i, j)),
    ]
}

fn poly(node: &Node) -> Poly {
    let var = |i: u32| Poly::var(Var::new(i));
    match *node {
        Node::Zero => Poly::zero(),
        Node::One => Poly::one(),
        Node::Var(i) => var(i),
        Node::NotVar(i) => var(i).complement(),
        Node::Product(i, j) => &var(i) * &var(j),
    }
}

/// Every node the generator can produce, plus the complements of products.
fn universe() -> Vec<Poly> {
    let mut nodes = vec![Poly::zero(), Poly::one()];
    for i in 1..=NUM_VARS {
        nodes.push(poly(&Node::Var(i)));
        nodes.push(poly(&Node::NotVar(i)));
        for j in i + 1..=NUM_VARS {
            let product = poly(&Node::Product(i, j));
            nodes.push(product.complement());
            nodes.push(product);
        }
    }
    nodes
}

fn bit(bits: u32, var: Var) -> bool {
    (bits >> (var.id() - 1)) & 1 == 1
}

fn models(pairs: &[(Poly, Poly)]) -> Vec<u32> {
    (0..1u32 << NUM_VARS)
        .filter(|&bits| {
            pairs
                .iter()
                .all(|(a, b)| a.eval(|v| bit(bits, v)) == b.eval(|v| bit(bits, v)))
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn unions_keep_models(
        pairs in proptest::collection::vec((arb_node(), arb_node()), 1..12),
        pruning in any::<bool>(),
    ) {
        let mut store = EquivalenceStore::new(pruning, false);
        let mut accepted: Vec<(Poly, Poly)> = Vec::new();
        for (a, b) in &pairs {
            let (a, b) = (poly(a), poly(b));
            let res = store.union(&a, &b);
            accepted.push((a, b));
            if let Err(e) = res {
                prop_assert!(e.is_contradiction(), "{}", e);
                prop_assert!(models(&accepted).is_empty(), "false contradiction: {}", e);
                return Ok(());
            }
        }

        // Both sides of every union share a class
        for (a, b) in &accepted {
            prop_assert_eq!(store.find(a).unwrap(), store.find(b).unwrap(), "{} = {}", a, b);
        }

        let models = models(&accepted);
        for node in universe() {
            let root = store.find(&node).unwrap();
            let root_of_complement = store.find(&node.complement()).unwrap();
            if root.is_constant() {
                prop_assert_eq!(&root_of_complement, &root.complement(), "complement of {}", node);
            }
            for &bits in &models {
                let value = |p: &Poly| p.eval(|v| bit(bits, v));
                prop_assert_eq!(value(&node), value(&root), "{} -> {} (model {:b})", node, root, bits);
                prop_assert_eq!(
                    value(&root_of_complement),
                    value(&root.complement()),
                    "1 - {} (model {:b})", node, bits
                );
            }
        }
    }
}
