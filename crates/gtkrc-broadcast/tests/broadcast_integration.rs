//! Integration tests for the broadcast pipeline.
//!
//! These tests exercise gtkrc-broadcast end-to-end through its public API:
//! `BroadcastReloadUseCase` + the traversal from `gtkrc_core` + the in-memory
//! `RecordingDisplay`.

use gtkrc_broadcast::application::broadcast_reload::{
    BroadcastOptions, BroadcastReloadUseCase, ScreenScope,
};
use gtkrc_broadcast::infrastructure::display::RecordingDisplay;
use gtkrc_core::{DataFormat, ReloadSignal, Target, WindowId};

/// A desktop under a reparenting window manager:
///
/// ```text
/// root
/// ├── frame_a ── client_a (WM_STATE)
/// ├── frame_b ─┬ titlebar
/// │            └ client_b (WM_STATE)
/// ├── panel (WM_STATE)
/// └── tooltip (override-redirect, no WM_STATE)
/// ```
struct Desktop {
    display: RecordingDisplay,
    client_a: WindowId,
    client_b: WindowId,
    panel: WindowId,
    tooltip: WindowId,
    frame_a: WindowId,
}

fn desktop() -> Desktop {
    let mut display = RecordingDisplay::new();
    let root = display.root();
    let frame_a = display.add_window(root, false);
    let client_a = display.add_window(frame_a, true);
    let frame_b = display.add_window(root, false);
    display.add_window(frame_b, false);
    let client_b = display.add_window(frame_b, true);
    let panel = display.add_window(root, true);
    let tooltip = display.add_window(root, false);
    Desktop {
        display,
        client_a,
        client_b,
        panel,
        tooltip,
        frame_a,
    }
}

#[test]
fn test_default_broadcast_reaches_every_top_level_client() {
    // Arrange
    let d = desktop();
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    // Act
    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    // Assert
    let windows: Vec<WindowId> = uc.display().sent.iter().map(|s| s.window).collect();
    assert_eq!(windows, vec![d.client_a, d.client_b, d.panel, d.tooltip]);
    assert_eq!(report.recipients, windows);
    assert_eq!(uc.display().flushes, 1);
}

#[test]
fn test_every_sent_message_carries_the_wire_contract() {
    let d = desktop();
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    let atom = uc
        .display()
        .atom("_GTK_READ_RCFILES")
        .expect("atom must have been interned");
    for sent in &uc.display().sent {
        assert_eq!(sent.atom, atom);
        assert_eq!(sent.message.atom_name(), "_GTK_READ_RCFILES");
        assert_eq!(sent.message.format(), DataFormat::Bytes);
        assert_eq!(sent.message.target(), Target::Broadcast);
        assert!(sent.message.send_event());
    }
}

#[test]
fn test_repeated_broadcasts_are_identical() {
    // Arrange
    let d = desktop();
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    // Act
    let first = uc.broadcast(ReloadSignal::RcFiles).expect("first");
    let first_sent = uc.display().sent.clone();
    let second = uc.broadcast(ReloadSignal::RcFiles).expect("second");
    let second_sent = uc.display().sent[first_sent.len()..].to_vec();

    // Assert
    assert_eq!(first, second);
    assert_eq!(first_sent, second_sent);
}

#[test]
fn test_frames_never_receive_the_message() {
    let d = desktop();
    let frame_a = d.frame_a;
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    assert!(uc.display().sent.iter().all(|s| s.window != frame_a));
}

#[test]
fn test_window_destroyed_mid_broadcast_is_skipped() {
    // Arrange: client_a is still listed under its frame but already gone.
    let mut d = desktop();
    d.display.refuse_sends_to(d.panel);
    d.display.destroy(d.client_a);
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    // Act
    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    // Assert: frame_a has no reachable client, so as a top-level it receives
    // the fallback message; the panel refused the send.
    assert_eq!(report.recipients, vec![d.frame_a, d.client_b, d.tooltip]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
}

#[test]
fn test_dry_run_sends_nothing() {
    let d = desktop();
    let options = BroadcastOptions {
        dry_run: true,
        ..Default::default()
    };
    let mut uc = BroadcastReloadUseCase::new(d.display, options);

    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    assert_eq!(report.recipients.len(), 4);
    assert!(uc.display().sent.is_empty());
    assert_eq!(uc.display().flushes, 0);
}

#[test]
fn test_all_screens_scope_covers_secondary_screen() {
    // Arrange
    let mut display = RecordingDisplay::with_screens(2);
    let first = display.add_window(display.root(), true);
    let second = display.add_window(display.screen_root(1), true);
    let options = BroadcastOptions {
        scope: ScreenScope::All,
        ..Default::default()
    };
    let mut uc = BroadcastReloadUseCase::new(display, options);

    // Act
    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    // Assert
    assert_eq!(report.screens, 2);
    assert_eq!(report.recipients, vec![first, second]);
}

#[test]
fn test_default_scope_ignores_secondary_screen() {
    let mut display = RecordingDisplay::with_screens(2);
    let first = display.add_window(display.root(), true);
    display.add_window(display.screen_root(1), true);
    let mut uc = BroadcastReloadUseCase::new(display, BroadcastOptions::default());

    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    assert_eq!(report.recipients, vec![first]);
}

#[test]
fn test_broadcast_all_sends_each_signal_in_order() {
    let d = desktop();
    let mut uc = BroadcastReloadUseCase::new(d.display, BroadcastOptions::default());

    let reports = uc
        .broadcast_all(&[ReloadSignal::IconThemes, ReloadSignal::RcFiles])
        .expect("broadcast");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].signal, ReloadSignal::IconThemes);
    assert_eq!(reports[1].signal, ReloadSignal::RcFiles);
    let names: Vec<&str> = uc
        .display()
        .sent
        .iter()
        .map(|s| s.message.atom_name())
        .collect();
    assert_eq!(names[..4], ["_GTK_LOAD_ICONTHEMES"; 4]);
    assert_eq!(names[4..], ["_GTK_READ_RCFILES"; 4]);
}

#[test]
fn test_empty_display_broadcast_succeeds_with_no_recipients() {
    let mut uc = BroadcastReloadUseCase::new(RecordingDisplay::new(), BroadcastOptions::default());

    let report = uc.broadcast(ReloadSignal::RcFiles).expect("broadcast");

    assert!(report.recipients.is_empty());
    assert_eq!(uc.display().flushes, 1);
}
