use super::*;
use crate::design::state::SpineToggles;

#[test]
fn block_height_counts_line_advances() {
    assert!((block_height(10.0, 1, 1.3, 1.13) - 11.3).abs() < 1e-9);
    assert!((block_height(10.0, 3, 1.3, 1.13) - 11.3 * (2.6 + 1.0)).abs() < 1e-9);
    assert_eq!(block_height(10.0, 0, 1.3, 1.13), block_height(10.0, 1, 1.3, 1.13));
}

#[test]
fn lines_are_uppercased_independently() {
    let mut s = DesignState::default();
    s.set_line(0, "first");
    s.set_line_upper(0, true);
    s.set_line(1, "second");
    s.set_line_upper(1, false);
    let c = title_content(&s, &EngineConfig::default());
    assert_eq!(c.lines, vec!["FIRST".to_string(), "second".to_string()]);
    assert!(!c.ghost);
}

#[test]
fn empty_title_falls_back_to_ghost() {
    let mut s = DesignState::default();
    s.set_line(0, "");
    let cfg = EngineConfig::default();
    let c = title_content(&s, &cfg);
    assert!(c.ghost);
    assert_eq!(c.opacity, cfg.ghost_opacity);
    assert_eq!(c.lines[0], "THE VISUAL DIARY");
    assert_eq!(c.lines.len(), 4);

    let d = date_content(&s, &cfg).unwrap();
    assert!(d.ghost);
    assert_eq!(d.lines, vec!["2025".to_string()]);
}

#[test]
fn spine_joins_title_and_date() {
    let mut s = DesignState::default();
    s.set_date("2025");
    assert_eq!(
        spine_text(&s, " \u{2022} ").as_deref(),
        Some("THE VISUAL DIARY \u{2022} 2025")
    );
    s.set_line(1, "vol");
    assert_eq!(
        spine_text(&s, " | ").as_deref(),
        Some("THE VISUAL DIARY vol | 2025")
    );
}

#[test]
fn spine_toggles_drop_parts() {
    let mut s = DesignState::default();
    s.set_date("2025");
    s.set_spine(SpineToggles {
        symbol: true,
        title: false,
        date: true,
    });
    assert_eq!(spine_text(&s, " \u{2022} ").as_deref(), Some("2025"));
    s.set_spine(SpineToggles {
        symbol: true,
        title: false,
        date: false,
    });
    assert_eq!(spine_text(&s, " \u{2022} "), None);
}

#[test]
fn magazine_uses_first_two_lines_only() {
    let mut s = DesignState::default();
    s.set_line(1, "two");
    s.set_line(2, "three");
    let c = magazine_content(&s, &EngineConfig::default());
    assert_eq!(c.lines, vec!["THE VISUAL DIARY".to_string(), "two".to_string()]);
}

#[test]
fn title_block_includes_date_group() {
    let mut s = DesignState::default();
    s.set_date("2025");
    let cfg = EngineConfig::default();
    let b = TitleBlock::measure(&s, &cfg, 10.0, false);
    assert!((b.title_size_px - 12.0).abs() < 1e-9);
    assert!((b.date_gap_px - 20.0).abs() < 1e-9);
    let expected = b.title_height + 20.0 + 5.0 * 1.13;
    assert!((b.height - expected).abs() < 1e-9);

    let compact = TitleBlock::measure(&s, &cfg, 10.0, true);
    assert!((compact.title_size_px - 8.0).abs() < 1e-9);
    assert!((compact.date_gap_px - 10.0).abs() < 1e-9);
}
