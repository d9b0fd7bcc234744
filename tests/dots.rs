use std::collections::HashSet;

use anacycle_wasm::dissolve::{dissolve_amount, DissolveFrame, DissolveLayer, DissolveMap};
use anacycle_wasm::migration::{Anchor, Circulation, Density, DotState, Migration, Partition, ScrollMigration, Side};
use anacycle_wasm::pixels::PixelBuffer;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn solid_layer(width: usize, height: usize, rng: &mut SmallRng) -> DissolveLayer {
    let reference = PixelBuffer::from_rgba(width, height, [0, 0, 0, 255].repeat(width * height)).unwrap();
    let map = DissolveMap::random(reference.len(), rng);
    DissolveLayer::new(reference, map).unwrap()
}

const ORIGIN: Anchor = Anchor {
    left: 0.0,
    top: 0.0,
    scale_x: 1.0,
    scale_y: 1.0,
};

const BELOW: Anchor = Anchor {
    left: 0.0,
    top: 500.0,
    scale_x: 1.0,
    scale_y: 1.0,
};

#[test]
fn dissolve_thins_out_with_amount() {
    let mut rng = SmallRng::seed_from_u64(1);
    let layer = solid_layer(20, 10, &mut rng);
    assert_eq!(layer.dots().len(), 200);

    let none = HashSet::new();
    let dense = match layer.frame(dissolve_amount(0.0, 0.1, 0.9), &none, 0.0, 1.0) {
        DissolveFrame::Dots(draws) => draws.len(),
        DissolveFrame::Mask(_) => panic!("0.1 is far from the midpoint"),
    };
    let sparse = match layer.frame(dissolve_amount(1.0, 0.1, 0.9), &none, 0.0, 1.0) {
        DissolveFrame::Dots(draws) => draws.len(),
        DissolveFrame::Mask(_) => panic!("0.9 is far from the midpoint"),
    };
    assert!(dense > sparse);
    assert_eq!(dense, layer.visible_dots(0.1).count());
}

#[test]
fn scroll_migration_moves_everything_by_the_end() {
    let mut rng = SmallRng::seed_from_u64(2);
    let source = solid_layer(10, 10, &mut rng);
    let target = solid_layer(10, 10, &mut rng);
    let partition = Partition::split(source.dots(), target.dots(), &Density::default(), &mut rng).unwrap();
    assert_eq!(partition.movers.len(), 45);
    let static_source: HashSet<usize> = partition.static_source.iter().map(|d| d.pixel).collect();

    let mut migration = ScrollMigration::new(partition);
    // the first pair completes at progress 0
    assert_eq!(migration.visible_indices(Side::Source).len(), 5 + 44);
    assert!(migration.travelers(&ORIGIN, &BELOW, 0.0).is_empty());

    migration.set_scroll(0.5);
    assert_eq!(migration.travelers(&ORIGIN, &BELOW, 0.0).len(), 22);
    assert_eq!(migration.states().filter(|&s| s == DotState::AtTarget).count(), 23);

    migration.set_scroll(1.0);
    assert_eq!(migration.visible_indices(Side::Source), static_source);
    assert!(migration.travelers(&ORIGIN, &BELOW, 0.0).is_empty());
    assert!(migration.states().all(|s| s == DotState::AtTarget));
}

#[test]
fn circulation_keeps_every_dot_accounted_for() {
    let mut rng = SmallRng::seed_from_u64(3);
    let source = solid_layer(10, 10, &mut rng);
    let target = solid_layer(10, 10, &mut rng);
    let partition = Partition::split(source.dots(), target.dots(), &Density::default(), &mut rng).unwrap();
    let static_source = partition.static_source.len();

    let mut circulation = Circulation::new(partition, 0.002, &mut rng);
    let mut seen_travelling = false;
    for frame in 0..600 {
        circulation.advance();
        let at_source = circulation.dots().iter().filter(|d| d.state == DotState::AtSource).count();
        let travelling = circulation.dots().iter().filter(|d| d.travel().is_some()).count();
        seen_travelling |= travelling > 0;

        // visible pixels are a set, so only the source side (distinct pixels) is exact
        assert_eq!(circulation.visible_indices(Side::Source).len(), static_source + at_source);
        assert_eq!(circulation.travelers(&ORIGIN, &BELOW, frame as f64).len(), travelling);
    }
    assert!(seen_travelling);
}
