use std::mem::size_of;

use rand::seq::SliceRandom;
use rand::thread_rng;
use zeyrho::BTree;

const VALUES: i32 = 20000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut tree = BTree::new();
    for i in 0..VALUES {
        tree.add(i);
    }

    println!("size of tree: {}", size_of::<BTree<i32>>());
    println!("values: {}, height: {}", tree.len(), tree.height());

    let mut order: Vec<i32> = (0..VALUES).collect();
    order.shuffle(&mut thread_rng());
    for value in &order[..order.len() / 2] {
        tree.remove(value);
    }
    tree.validate()?;

    println!("after removing half in random order");
    println!("values: {}, height: {}", tree.len(), tree.height());
    println!("first: {:?}, last: {:?}", tree.first(), tree.last());

    Ok(())
}
