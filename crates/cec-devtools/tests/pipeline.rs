//! End-to-end tests for cec-devtools
//!
//! Page → content relay → background → panel, and back again for replays.

use std::cell::RefCell;
use std::rc::Rc;

use cec_devtools::{
    Background, ContentRelay, Envelope, MemoryClipboard, PageMessage, Panel, Response,
    RuntimeMessage, Settings, SettingsStore, TabEvent, TabInfo, drain_replays, install,
};
use cec_dom::{CustomEvent, EventTarget, NodeId, Window};
use serde_json::json;
use smol::channel::{self, Receiver};

const PAGE: &str = r#"
<!doctype html>
<html>
  <body>
    <x-cart id="cart">
      <template shadowrootmode="open">
        <ul><li>One</li><li>Two</li></ul>
        <button class="checkout">Checkout</button>
      </template>
    </x-cart>
  </body>
</html>
"#;

const STACK: &str = "Error
    at hook (chrome-extension://cec/inject.js:60:23)
    at dispatch (https://shop.example/static/vendor.js:1:100)
    at checkout (https://shop.example/static/cart.js:42:17)";

/// One tab wired to a background
struct Tab {
    window: Window,
    relay: ContentRelay,
    from_page: Receiver<PageMessage>,
    to_page_rx: Receiver<PageMessage>,
}

impl Tab {
    fn open(id: u32, settings: &Settings, to_background: channel::Sender<Envelope>) -> Self {
        let mut window = Window::new(cec_html::parse(PAGE).unwrap());
        let (page_tx, from_page) = channel::unbounded();
        assert!(install(&mut window, page_tx));

        let (to_page, to_page_rx) = channel::unbounded();
        let relay = ContentRelay::new(
            TabInfo::new(id, format!("https://shop.example/{id}")),
            settings,
            to_background,
            to_page,
            MemoryClipboard::new(),
        );
        Self {
            window,
            relay,
            from_page,
            to_page_rx,
        }
    }

    fn checkout_button(&self) -> NodeId {
        let tree = self.window.tree();
        let host = cec_css::query_selector(tree, tree.root(), "#cart")
            .unwrap()
            .unwrap();
        let shadow = tree.shadow_root(host).unwrap();
        cec_css::query_selector(tree, shadow, "button.checkout")
            .unwrap()
            .unwrap()
    }

    /// Let the relay forward everything the page posted
    fn flush(&self) -> usize {
        self.relay.relay_pending(&self.from_page).unwrap()
    }

    /// Let the page perform queued replays
    fn run_replays(&mut self) -> usize {
        drain_replays(&mut self.window, &self.to_page_rx)
    }
}

/// Feed every queued envelope to the background
fn deliver(background: &mut Background, inbox: &Receiver<Envelope>) -> Vec<Response> {
    let mut responses = Vec::new();
    while let Ok(envelope) = inbox.try_recv() {
        if let Some(response) = background.handle(envelope.message, &envelope.sender) {
            responses.push(response);
        }
    }
    responses
}

// ============================================================================
// Capture
// ============================================================================

#[test]
fn test_captured_event_reaches_panel() {
    let settings = Settings::default();
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);
    let panel_rx = background.connect_panel();
    let mut panel = Panel::new(Some(1), &settings);

    let mut tab = Tab::open(1, &settings, bg_tx);
    let button = tab.checkout_button();
    tab.window.dispatch_event(
        button.into(),
        CustomEvent::new("cart:checkout", json!({"items": 2})).with_stack(STACK),
    );
    assert_eq!(tab.flush(), 1);
    deliver(&mut background, &bg_rx);
    assert_eq!(panel.pump(&panel_rx), 1);

    let rows = panel.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_type, "cart:checkout");
    assert_eq!(rows[0].detail, r#"{"items":2}"#);
    assert_eq!(
        rows[0].target,
        r#"html:nth-child(1) > body:nth-child(2) > [id="cart"]:shadow-root button:nth-child(2)"#
    );
    assert_eq!(rows[0].initiator, "cart.js:42");
    assert_eq!(background.badge(1).unwrap().text, "1");

    let stored = &panel.events()[0];
    assert_eq!(stored.target_tag.as_deref(), Some("BUTTON"));
    assert_eq!(stored.tab_url.as_deref(), Some("https://shop.example/1"));
}

#[test]
fn test_paused_capture_forwards_nothing() {
    let settings = Settings {
        capture_enabled: false,
        ..Settings::default()
    };
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);
    let mut tab = Tab::open(1, &settings, bg_tx);

    tab.window
        .dispatch_event(EventTarget::Window, CustomEvent::new("ignored", json!(null)));
    assert_eq!(tab.flush(), 0);

    tab.relay
        .handle_message(RuntimeMessage::CaptureToggle { enabled: Some(true) });
    background.handle(
        RuntimeMessage::CaptureToggle { enabled: Some(true) },
        &TabInfo::default(),
    );
    tab.window
        .dispatch_event(EventTarget::Window, CustomEvent::new("seen", json!(null)));
    assert_eq!(tab.flush(), 1);
    deliver(&mut background, &bg_rx);
    assert_eq!(background.buffer().len(), 1);
}

#[test]
fn test_late_panel_gets_backlog_for_its_tab() {
    let settings = Settings::default();
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);

    let mut first = Tab::open(1, &settings, bg_tx.clone());
    let mut second = Tab::open(2, &settings, bg_tx);
    for n in 0..3 {
        first
            .window
            .dispatch_event(EventTarget::DOCUMENT, CustomEvent::new("first", json!(n)));
    }
    second
        .window
        .dispatch_event(EventTarget::DOCUMENT, CustomEvent::new("second", json!(0)));
    first.flush();
    second.flush();
    deliver(&mut background, &bg_rx);

    let panel_rx = background.connect_panel();
    let mut panel = Panel::new(Some(2), &settings);
    background.handle(Panel::ready_message(), &TabInfo::default());
    panel.pump(&panel_rx);

    assert_eq!(panel.events().len(), 1);
    assert_eq!(panel.events()[0].event_type, "second");
    assert_eq!(panel.rows()[0].target, "document");

    let (request, reply) = Envelope::request(RuntimeMessage::CountRequest, TabInfo::default());
    let count = background.handle(request.message, &request.sender);
    assert_eq!(count, Some(Response::Count { count: 4 }));
    drop(reply);
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn test_replay_hits_the_captured_element() {
    let settings = Settings::default();
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);
    let panel_rx = background.connect_panel();
    let mut panel = Panel::new(Some(1), &settings);
    let mut tab = Tab::open(1, &settings, bg_tx);

    let button = tab.checkout_button();
    let hits = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&hits);
    tab.window.add_event_listener(
        button.into(),
        "cart:checkout",
        Box::new(move |event, _| log.borrow_mut().push(event.detail.clone())),
    );

    tab.window
        .dispatch_event(button.into(), CustomEvent::new("cart:checkout", json!({"n": 1})));
    tab.flush();
    deliver(&mut background, &bg_rx);
    panel.pump(&panel_rx);

    let response = tab
        .relay
        .handle_message(Panel::replay_message(&panel.events()[0]));
    assert_eq!(response, Some(Response::ok()));
    assert_eq!(tab.run_replays(), 1);
    assert_eq!(*hits.borrow(), vec![json!({"n": 1}), json!({"n": 1})]);

    // The replay is itself captured
    assert_eq!(tab.flush(), 1);
}

#[test]
fn test_replay_after_removal_falls_back_to_window() {
    let settings = Settings::default();
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);
    let panel_rx = background.connect_panel();
    let mut panel = Panel::new(Some(1), &settings);
    let mut tab = Tab::open(1, &settings, bg_tx);

    let button = tab.checkout_button();
    tab.window
        .dispatch_event(button.into(), CustomEvent::new("cart:checkout", json!(null)));
    tab.flush();
    deliver(&mut background, &bg_rx);
    panel.pump(&panel_rx);

    let parent = tab.window.tree().parent(button).unwrap();
    tab.window
        .document_mut()
        .tree_mut()
        .remove_child(parent, button)
        .unwrap();

    let on_window = Rc::new(RefCell::new(0));
    let count = Rc::clone(&on_window);
    tab.window.add_event_listener(
        EventTarget::Window,
        "cart:checkout",
        Box::new(move |_, _| *count.borrow_mut() += 1),
    );

    tab.relay
        .handle_message(Panel::replay_message(&panel.events()[0]));
    tab.run_replays();
    assert_eq!(*on_window.borrow(), 1);
}

#[test]
fn test_copy_command_reaches_clipboard() {
    let settings = Settings::default();
    let (bg_tx, _bg_rx) = channel::unbounded();
    let mut tab = Tab::open(1, &settings, bg_tx);

    let payload = cec_devtools::CustomEventPayload::new("cart:add", json!({"sku": "A1"}), 0);
    let response = tab.relay.handle_message(Panel::copy_message(&payload));
    assert_eq!(response, Some(Response::ok()));
    assert!(
        tab.relay
            .clipboard()
            .contents()
            .unwrap()
            .starts_with("window.dispatchEvent(new CustomEvent(\"cart:add\"")
    );
}

// ============================================================================
// Settings and async loop
// ============================================================================

#[test]
fn test_panel_preferences_persist() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.json"));

    let mut settings = store.load().unwrap();
    let mut panel = Panel::new(Some(5), &settings);
    panel.set_detail_filter("sku");
    panel.set_preserve_log(true);
    panel.save_to(&mut settings);
    store.save(&settings).unwrap();

    let reopened = Panel::new(Some(5), &store.load().unwrap());
    assert_eq!(reopened.filters().detail, "sku");
    assert!(reopened.preserve_log());
}

#[test]
fn test_async_pipeline() {
    let settings = Settings::default();
    let (bg_tx, bg_rx) = channel::unbounded();
    let mut background = Background::new(&settings);
    let panel_rx = background.connect_panel();

    let mut tab = Tab::open(3, &settings, bg_tx.clone());
    for n in 0..5 {
        tab.window
            .dispatch_event(EventTarget::Window, CustomEvent::new("tick", json!(n)));
    }
    let (request, reply) = Envelope::request(RuntimeMessage::CountRequest, TabInfo::default());

    let Tab {
        window,
        relay,
        from_page,
        ..
    } = tab;
    drop(window);

    let mut background = smol::block_on(async {
        let forwarded = relay.relay_page(from_page).await.unwrap();
        assert_eq!(forwarded, 5);
        bg_tx.send(request).await.unwrap();
        drop(bg_tx);
        drop(relay);
        background.run(bg_rx).await
    });

    assert_eq!(reply.try_recv(), Ok(Response::Count { count: 5 }));
    assert_eq!(background.badge(3).unwrap().text, "5");
    assert_eq!(panel_rx.len(), 5);

    background.on_tab_event(TabEvent::Removed(3));
    assert_eq!(background.badge(3), None);
    background.on_tab_event(TabEvent::NavigationComplete(3));
    assert_eq!(background.badge(3).unwrap().text, "5");
}
