//! Property tree behavior through the public API: typed access, coercion,
//! subscriber ordering, publisher freshness, and cross-thread use.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use rust_sdr::hardware::{MockRegisters, RegisterIo};
use rust_sdr::types::{MboardEeprom, MetaRange};
use rust_sdr::{PropertyTree, SdrError};

#[test]
fn typed_values_round_trip_unchanged() {
    let tree = PropertyTree::new();

    tree.create::<f64>("/mb/tick_rate").unwrap();
    tree.set("/mb/tick_rate", 64e6).unwrap();
    assert_eq!(tree.get::<f64>("/mb/tick_rate").unwrap(), 64e6);

    tree.create::<String>("/mb/name").unwrap();
    tree.set("/mb/name", "usrp1".to_string()).unwrap();
    assert_eq!(tree.get::<String>("/mb/name").unwrap(), "usrp1");

    // opaque records pass through without the tree touching their structure
    let mut eeprom = MboardEeprom::default();
    eeprom.set("serial", "4d9b21");
    tree.create::<MboardEeprom>("/mb/eeprom").unwrap();
    tree.set("/mb/eeprom", eeprom.clone()).unwrap();
    assert_eq!(tree.get::<MboardEeprom>("/mb/eeprom").unwrap(), eeprom);

    tree.create::<Vec<String>>("/mb/clock_source/options").unwrap();
    tree.set("/mb/clock_source/options", vec!["internal".to_string()]).unwrap();
    assert_eq!(
        tree.get::<Vec<String>>("/mb/clock_source/options").unwrap(),
        vec!["internal"]
    );
}

#[test]
fn range_coercion_is_idempotent_through_the_tree() {
    let tree = PropertyTree::new();
    let range = MetaRange::with_step(0.0, 20.0, 0.05);
    let gain = tree.create::<f64>("/codec/gains/pga/value").unwrap();
    gain.coerce(move |g| range.clamp(g));

    tree.set("/codec/gains/pga/value", 35.0).unwrap();
    let clamped = tree.get::<f64>("/codec/gains/pga/value").unwrap();
    assert_eq!(clamped, 20.0);

    // feeding the coerced value back through set changes nothing
    tree.set("/codec/gains/pga/value", clamped).unwrap();
    assert_eq!(tree.get::<f64>("/codec/gains/pga/value").unwrap(), clamped);
}

#[test]
fn subscribers_run_in_registration_order() {
    for n in [1usize, 2, 5] {
        let tree = PropertyTree::new();
        let node = tree.create::<i32>("/n").unwrap();
        let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        for i in 0..n {
            let order = order.clone();
            node.subscribe(move |_| {
                order.lock().push(i);
                Ok(())
            });
        }
        tree.set("/n", 1).unwrap();
        assert_eq!(*order.lock(), (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn failing_subscriber_stops_the_chain_but_keeps_prior_effects() {
    let tree = PropertyTree::new();
    let regs = Arc::new(MockRegisters::new());
    let node = tree.create::<f64>("/gain").unwrap();

    let r = regs.clone();
    node.subscribe(move |g| r.poke32(0x20, *g as u32));
    node.subscribe(|_| Err(anyhow::anyhow!("spi timeout")));
    let r = regs.clone();
    node.subscribe(move |g| r.poke32(0x21, *g as u32));

    let err = tree.set("/gain", 7.0).unwrap_err();
    assert!(matches!(err, SdrError::HardwareWrite { .. }));
    // the first register write happened, the one after the failure did not
    assert_eq!(regs.last_write(0x20), Some(7));
    assert_eq!(regs.last_write(0x21), None);
    // the coerced value is stored even though propagation failed
    assert_eq!(tree.get::<f64>("/gain").unwrap(), 7.0);
}

#[test]
fn published_paths_never_serve_stale_values() {
    let tree = PropertyTree::new();
    let regs = Arc::new(MockRegisters::new().with_register(0x07, 64_000_000));
    let clock = 64e6;

    let node = tree.create::<f64>("/time/now").unwrap();
    let r = regs.clone();
    node.publish(move || Ok(f64::from(r.peek32(0x07)?) / clock)).unwrap();

    assert_eq!(tree.get::<f64>("/time/now").unwrap(), 1.0);
    // hardware advances behind the driver's back
    regs.set_register(0x07, 128_000_000);
    assert_eq!(tree.get::<f64>("/time/now").unwrap(), 2.0);
}

#[test]
fn structure_operations_shape_the_hierarchy() {
    let tree = PropertyTree::new();
    for path in [
        "/mboards/0/dboards/A/rx_eeprom",
        "/mboards/0/dboards/B/rx_eeprom",
        "/mboards/0/tick_rate",
    ] {
        tree.create::<i32>(path).unwrap();
    }

    assert_eq!(tree.list("/mboards/0"), vec!["dboards", "tick_rate"]);
    assert_eq!(tree.list("/mboards/0/dboards"), vec!["A", "B"]);
    assert!(tree.list("/mboards/0/tick_rate").is_empty());
    assert!(tree.list("/not/there").is_empty());

    tree.pop("/mboards/0/dboards/A").unwrap();
    assert!(!tree.exists("/mboards/0/dboards/A/rx_eeprom"));
    assert_eq!(tree.list("/mboards/0/dboards"), vec!["B"]);
    assert!(matches!(
        tree.pop("/mboards/0/dboards/A"),
        Err(SdrError::NotFound { .. })
    ));
}

#[test]
fn subtree_views_are_transparent() {
    let tree = PropertyTree::new();
    let db = tree.subtree("/mboards/0/dboards/A");
    db.create::<f64>("rx_frontends/0/freq/value").unwrap();
    db.set("rx_frontends/0/freq/value", 2.4e9).unwrap();

    // visible at the full path, and through a nested view
    assert_eq!(
        tree.get::<f64>("/mboards/0/dboards/A/rx_frontends/0/freq/value").unwrap(),
        2.4e9
    );
    let fe = db.subtree("rx_frontends/0");
    assert_eq!(fe.get::<f64>("freq/value").unwrap(), 2.4e9);
}

#[test]
fn control_and_timer_threads_share_the_tree() {
    let tree = PropertyTree::new();
    let gain = tree.create::<f64>("/codec/gain").unwrap();
    let range = MetaRange::with_step(0.0, 20.0, 0.05);
    gain.coerce(move |g| range.clamp(g));
    tree.create::<f64>("/time/now").unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                tree.set("/codec/gain", f64::from(i % 40)).unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..200 {
                tree.set("/time/now", f64::from(i) * 1e-3).unwrap();
            }
        });
    });

    let gain = tree.get::<f64>("/codec/gain").unwrap();
    assert!((0.0..=20.0).contains(&gain));
    assert!(tree.get::<f64>("/time/now").unwrap() >= 0.0);
}
