//! Integration tests for tapestry-tui.
//!
//! These tests exercise the public API from outside the crate: style sheets,
//! widgets, layout, compositing and the tick cycle working together.

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use tapestry_tui::css::cascade::Cascade;
use tapestry_tui::css::color::Color;
use tapestry_tui::css::specificity::Origin;
use tapestry_tui::dom::{DirtyFlags, NodeId, QueryError};
use tapestry_tui::geometry::Region;
use tapestry_tui::reactive::SetOutcome;
use tapestry_tui::screen::{Screen, ScreenError};
use tapestry_tui::testing::{render_to_string, Pilot};
use tapestry_tui::widget::WidgetExt;
use tapestry_tui::widgets::{Container, Static};

fn region_of(screen: &Screen, node: NodeId) -> Region {
    screen.layout_of(node).map(|b| b.region).unwrap_or_default()
}

/// A horizontal root with one `Static` per width, `#c0`, `#c1`, ...
fn horizontal_row(width: u16, widths: &[&str]) -> (Screen, Vec<NodeId>) {
    let mut screen = Screen::new(width, 1);
    let mut css = String::from("Container { layout: horizontal; }\n");
    for (i, w) in widths.iter().enumerate() {
        css.push_str(&format!("#c{i} {{ width: {w}; }}\n"));
    }
    assert!(screen.add_stylesheet("app", &css).is_empty());
    let root = screen.mount_root(Container::new()).unwrap();
    let children = (0..widths.len())
        .map(|i| screen.mount(root, Static::new("").with_id(&format!("c{i}"))).unwrap())
        .collect();
    screen.frame();
    (screen, children)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn grid_three_by_two_then_seventh_child_adds_a_row() {
    let mut pilot = Pilot::new(30, 6).with_css("Container { layout: horizontal; grid-size: 3 2; }");
    let root = pilot.mount_root(Container::new()).unwrap();
    let mut cells: Vec<NodeId> = (1..=6).map(|i| pilot.mount(root, Static::new(i.to_string())).unwrap()).collect();
    pilot.tick();

    for (i, &node) in cells.iter().enumerate() {
        let (col, row) = (i as i32 % 3, i as i32 / 3);
        assert_eq!(region_of(pilot.screen(), node), Region::new(col * 10, row * 3, 10, 3));
    }
    assert_eq!(pilot.snapshot(), "1         2         3\n\n\n4         5         6\n\n");

    cells.push(pilot.mount(root, Static::new("7")).unwrap());
    pilot.tick();
    for (i, &node) in cells.iter().enumerate() {
        let (col, row) = (i as i32 % 3, i as i32 / 3);
        assert_eq!(region_of(pilot.screen(), node), Region::new(col * 10, row * 2, 10, 2));
    }
    assert!(pilot.screen().diagnostics.is_empty());
}

#[test]
fn removing_started_class_shows_stop_again() {
    let mut pilot = Pilot::new(10, 2).with_css("Static { height: 1; }\n.started #stop { display: none; }");
    let root = pilot.mount_root(Container::new().with_class("started")).unwrap();
    pilot.mount(root, Static::new("go").with_id("start")).unwrap();
    let stop = pilot.mount(root, Static::new("stop").with_id("stop")).unwrap();
    pilot.tick();
    assert_eq!(pilot.snapshot(), "go\n");
    assert!(pilot.screen().layout_of(stop).map_or(true, |b| b.region.is_empty()));

    assert!(pilot.remove_class(root, "started").unwrap());
    let report = pilot.tick();
    assert_eq!(report.patches, 1);
    assert_eq!(pilot.snapshot(), "go\nstop");
    assert_eq!(region_of(pilot.screen(), stop), Region::new(0, 1, 10, 1));
}

#[test]
fn nested_border_background_and_text() {
    let mut pilot = Pilot::new(12, 4).with_css(
        "Container { border: solid; background: #000080; padding: 0 1; }\n\
         Static { height: 1; color: white; text-align: center; }",
    );
    let root = pilot.mount_root(Container::new()).unwrap();
    let label = pilot.mount(root, Static::new("hi")).unwrap();
    pilot.tick();
    insta::assert_snapshot!(pilot.snapshot(), @r"
    ┌──────────┐
    │    hi    │
    │          │
    └──────────┘
    ");
    let frame = pilot.screen().compositor.frame();
    assert_eq!(frame.get(5, 1).and_then(|c| c.style.bg), Some(Color::rgb(0, 0, 128)));
    assert_eq!(frame.get(5, 1).and_then(|c| c.style.fg), Some(Color::WHITE));
    assert_eq!(pilot.screen().node_at(5, 1), Some(label));
    assert_eq!(pilot.screen().node_at(0, 0), Some(root));
}

// ---------------------------------------------------------------------------
// Testable properties
// ---------------------------------------------------------------------------

#[test]
fn unchanged_frame_produces_no_patches() {
    let mut pilot = Pilot::new(20, 3).with_css("Static { height: 1; }");
    let root = pilot.mount_root(Container::new()).unwrap();
    pilot.mount(root, Static::new("a")).unwrap();
    pilot.mount(root, Static::new("b")).unwrap();
    assert_eq!(pilot.tick().patches, 3);
    assert_eq!(pilot.tick().patches, 0);
    assert_eq!(pilot.screen().compositor.last_render_count(), 0);
}

#[test]
fn query_contracts() {
    let mut screen = Screen::new(10, 5);
    let root = screen.mount_root(Container::new()).unwrap();
    let a = screen.mount(root, Static::new("a").with_class("x")).unwrap();
    let inner = screen.mount(root, Container::new()).unwrap();
    let b = screen.mount(inner, Static::new("b").with_classes(&["x", "y"])).unwrap();
    let foo = screen.mount(root, Static::new("c").with_id("foo").with_class("x")).unwrap();

    assert_eq!(screen.query("#foo").unwrap().first(), Ok(foo));
    assert_eq!(
        screen.query("#bar").unwrap().first(),
        Err(QueryError::NotFound { selector: "#bar".to_owned() })
    );
    assert!(matches!(screen.query_one("#bar"), Err(ScreenError::Query(QueryError::NotFound { .. }))));
    assert_eq!(screen.query(".x").unwrap().all(), [a, b, foo]);
    assert_eq!(screen.query(".x").unwrap().exclude(&screen.dom, ".y").unwrap().all(), [a, foo]);
    assert!(matches!(
        screen.query(".x").unwrap().first_of_type(&screen.dom, "Container"),
        Err(QueryError::TypeMismatch { .. })
    ));
    assert!(matches!(screen.query("Static:bogus"), Err(ScreenError::Query(QueryError::InvalidSelector(_)))));
}

#[test]
fn fixed_and_fractional_children_fill_the_row_exactly() {
    let cases: [&[&str]; 5] = [
        &["10", "1fr", "2fr", "7"],
        &["1fr", "1fr", "1fr"],
        &["80", "1fr"],
        &["3", "1fr", "5", "2fr", "1fr"],
        &["1fr", "10%", "20"],
    ];
    for widths in cases {
        let (screen, children) = horizontal_row(80, widths);
        let lengths: Vec<i32> = children.iter().map(|&c| region_of(&screen, c).width).collect();
        assert!(lengths.iter().all(|&l| l >= 0), "{widths:?}: {lengths:?}");
        assert_eq!(lengths.iter().sum::<i32>(), 80, "{widths:?}: {lengths:?}");
        let mut x = 0;
        for &c in &children {
            assert_eq!(region_of(&screen, c).x, x);
            x += region_of(&screen, c).width;
        }
    }
}

#[test]
fn fractional_children_are_proportional() {
    for (w1, w2, total) in [(1, 3, 81), (2, 5, 50), (1, 1, 7), (3, 2, 100)] {
        let (screen, children) = horizontal_row(total, &[&format!("{w1}fr"), &format!("{w2}fr")]);
        let s1 = region_of(&screen, children[0]).width as f64;
        let s2 = region_of(&screen, children[1]).width as f64;
        let expected = f64::from(total) * f64::from(w1) / f64::from(w1 + w2);
        assert!((s1 - expected).abs() <= 1.0, "{w1}:{w2} of {total} gave {s1} and {s2}");
        assert_eq!(s1 + s2, f64::from(total));
    }
}

#[test]
fn cascade_is_deterministic_and_ranked_by_specificity() {
    let mut screen = Screen::new(10, 2);
    screen.add_stylesheet("late", "#a { color: red; }");
    screen.add_stylesheet("later", "Static { color: blue; } Static.x { background: green; }");
    let root = screen.mount_root(Container::new()).unwrap();
    let a = screen.mount(root, Static::new("a").with_id("a").with_class("x")).unwrap();
    screen.resolve_styles();

    let first = screen.cascade.resolve(a, &screen.dom);
    let second = screen.cascade.resolve(a, &screen.dom);
    assert_eq!(first.styles, second.styles);
    assert_eq!(screen.dom.styles(a), Some(&first.styles));
    assert_eq!(first.styles.color, Some(Color::rgb(255, 0, 0)));
    assert_eq!(first.styles.background, Color::parse("green"));

    let mut fresh = Cascade::new();
    fresh.add_source("later", Origin::User, "Static { color: blue; } Static.x { background: green; }");
    fresh.add_source("late", Origin::User, "#a { color: red; }");
    assert_eq!(fresh.resolve(a, &screen.dom).styles.color, first.styles.color);
}

#[test]
fn equal_write_is_a_no_op() {
    let mut screen = Screen::new(10, 1);
    let root = screen.mount_root(Container::new()).unwrap();
    let label = screen.mount(root, Static::new("same")).unwrap();
    screen.frame();

    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    screen
        .attrs
        .watch::<String, _>(label, Static::TEXT, move |_, _, _| seen.set(seen.get() + 1))
        .unwrap();

    assert_eq!(screen.set_attr(label, Static::TEXT, String::from("same")).unwrap(), SetOutcome::Unchanged);
    assert_eq!(calls.get(), 0);
    assert!(!screen.dom.is_dirty(label, DirtyFlags::LAYOUT | DirtyFlags::PAINT));
    assert!(screen.frame().is_empty());

    assert_eq!(screen.set_attr(label, Static::TEXT, String::from("diff")).unwrap(), SetOutcome::Changed);
    assert_eq!(calls.get(), 1);
    assert!(screen.dom.is_dirty(label, DirtyFlags::LAYOUT | DirtyFlags::PAINT));
}

// ---------------------------------------------------------------------------
// Background handoff
// ---------------------------------------------------------------------------

#[test]
fn background_result_lands_on_the_next_tick() {
    let mut pilot = Pilot::new(10, 1);
    let label = pilot.mount_root(Static::new("loading")).unwrap();
    pilot.tick();

    let sender = pilot.app().sender();
    let (token, cancel) = pilot.screen_mut().tasks.begin(label, "fetch");
    let worker = std::thread::spawn(move || {
        let body = String::from("loaded");
        if !cancel.is_cancelled() {
            sender.complete(token, move |screen| {
                let _ = screen.set_attr(label, Static::TEXT, body);
            });
        }
    });
    worker.join().unwrap();
    assert_eq!(pilot.snapshot(), "loading");

    let report = pilot.tick();
    assert_eq!(report.applied, 1);
    assert_eq!(pilot.snapshot(), "loaded");
}

// ---------------------------------------------------------------------------
// Widgets on their own
// ---------------------------------------------------------------------------

#[test]
fn static_renders_without_a_screen() {
    assert_eq!(render_to_string(&Static::new("Hello, World!"), 20, 1), "Hello, World!");
    assert_eq!(render_to_string(&Static::new("truncated"), 5, 1), "trunc");
}
