use std::sync::Arc;

use super::*;
use crate::assets::decode::DecodedImage;

fn img() -> LoadedImage {
    LoadedImage::Raster(Arc::new(DecodedImage::from_premul(1, 1, vec![0, 0, 0, 255])))
}

#[test]
fn begin_dedups_and_bumps_generation() {
    let mut t = ImageRequestTracker::new();
    let a = t.begin(7, ["a.png", "b.png", "a.png"]);
    assert_eq!(a.len(), 2);
    assert!(a.iter().all(|x| x.generation == 1 && x.revision == 7));
    let b = t.begin(8, ["a.png"]);
    assert_eq!(b[0].generation, 2);
    assert_eq!(t.generation(), 2);
}

#[test]
fn stale_delivery_is_discarded() {
    let mut t = ImageRequestTracker::new();
    let old = t.begin(1, ["main.jpg"]);
    let new = t.begin(2, ["main.jpg"]);

    assert_eq!(t.deliver(&old[0], Ok(img())), Delivery::Stale);
    assert!(t.get("main.jpg").is_none());
    assert_eq!(t.deliver(&new[0], Ok(img())), Delivery::Accepted);
    assert!(matches!(t.get("main.jpg"), Some(Ok(_))));
}

#[test]
fn unknown_reference_is_rejected() {
    let mut t = ImageRequestTracker::new();
    let tickets = t.begin(1, ["a.png"]);
    let forged = ImageTicket {
        reference: "b.png".to_string(),
        ..tickets[0].clone()
    };
    assert_eq!(t.deliver(&forged, Ok(img())), Delivery::Unknown);
}

#[test]
fn completion_tracks_failures_too() {
    let mut t = ImageRequestTracker::new();
    let tickets = t.begin(1, ["a.png", "b.png"]);
    assert!(!t.is_complete());
    assert_eq!(t.pending().collect::<Vec<_>>(), vec!["a.png", "b.png"]);

    t.deliver(&tickets[0], Ok(img()));
    t.deliver(
        &tickets[1],
        Err(AssetError::NotFound("b.png".to_string())),
    );
    assert!(t.is_complete());
    assert!(matches!(t.get("b.png"), Some(Err(AssetError::NotFound(_)))));
}

#[test]
fn revision_follows_latest_generation() {
    let mut t = ImageRequestTracker::new();
    assert_eq!(t.revision(), 0);
    t.begin(4, ["a.png"]);
    assert_eq!(t.revision(), 4);
    let tickets = t.begin(9, std::iter::empty());
    assert!(tickets.is_empty());
    assert_eq!((t.generation(), t.revision()), (2, 9));
}
