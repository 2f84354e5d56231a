//! Leptos DragDrop Bindings
//!
//! Mouse and keyboard bindings that drive a kanban [`DragSession`].
//! Uses a movement threshold to distinguish click from drag.

use kanban_board::dnd::{DragSession, DragStatus, OverTarget, PendingMove, PointerHalf};
use kanban_board::domain::Board;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    /// The session itself; not reactive, read through `status_read`
    pub session: StoredValue<DragSession>,
    pub status_read: ReadSignal<DragStatus>,
    pub status_write: WriteSignal<DragStatus>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending card id (mousedown but not yet dragging)
    pub pending_id_read: ReadSignal<Option<u32>>,
    pub pending_id_write: WriteSignal<Option<u32>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

pub fn create_dnd_signals() -> DndSignals {
    let (status_read, status_write) = signal(DragStatus::Idle);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<u32>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        session: StoredValue::new(DragSession::new()),
        status_read,
        status_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

fn publish(dnd: &DndSignals) {
    let status = dnd.session.with_value(|s| s.status());
    if dnd.status_read.get_untracked() != status {
        dnd.status_write.set(status);
    }
}

/// Reset pointer bookkeeping; briefly flags that a drag just ended so the
/// trailing click can be swallowed
pub fn end_drag(dnd: &DndSignals) {
    dnd.pending_id_write.set(None);
    dnd.drag_just_ended_write.set(true);
    publish(dnd);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Call once the committed move has settled, successfully or not
pub fn finish_commit(dnd: &DndSignals) {
    dnd.session.update_value(|s| s.finish());
    publish(dnd);
}

/// Create mousedown handler for draggable cards
/// Records pending drag with start position
pub fn make_on_mousedown(dnd: DndSignals, card_id: u32) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || !dnd.session.with_value(|s| s.is_idle()) {
            return;
        }
        // Ignore if target is input or button
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        dnd.pending_id_write.set(Some(card_id));
        dnd.start_x_write.set(ev.client_x());
        dnd.start_y_write.set(ev.client_y());
    }
}

/// Document mousemove: picks the card up once moved past the threshold
pub fn bind_global_mousemove(dnd: DndSignals, board: ReadSignal<Board>) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let Some(pending) = dnd.pending_id_read.get_untracked() else {
            return;
        };
        if !dnd.session.with_value(|s| s.is_idle()) {
            return;
        }
        let dx = (ev.client_x() - dnd.start_x_read.get_untracked()).abs();
        let dy = (ev.client_y() - dnd.start_y_read.get_untracked()).abs();
        if dx <= DRAG_THRESHOLD_PX && dy <= DRAG_THRESHOLD_PX {
            return;
        }

        let started = board.with_untracked(|b| dnd.session.try_update_value(|s| s.start(b, pending)));
        if let Some(Err(e)) = started {
            leptos::logging::warn!("drag not started: {}", e);
            dnd.pending_id_write.set(None);
        }
        publish(&dnd);
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

fn hover(dnd: &DndSignals, board: ReadSignal<Board>, over: Option<OverTarget>, half: PointerHalf) {
    if dnd.session.with_value(|s| s.active_card_id().is_none()) {
        return;
    }
    board.with_untracked(|b| {
        dnd.session.update_value(|s| {
            s.pointer_over(b, over, half);
        })
    });
    publish(dnd);
}

/// Which half of the hovered row the pointer is in
fn pointer_half(ev: &web_sys::MouseEvent) -> PointerHalf {
    ev.current_target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            PointerHalf::classify(f64::from(ev.client_y()), rect.top(), rect.height())
        })
        .unwrap_or_default()
}

/// Create mousemove handler for a card row (insert before or after it)
pub fn make_on_card_mousemove(dnd: DndSignals, board: ReadSignal<Board>, card_id: u32) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        hover(&dnd, board, Some(OverTarget::Card(card_id)), pointer_half(&ev));
    }
}

/// Create mouseenter handler for a list's empty area (append)
pub fn make_on_list_mouseenter(dnd: DndSignals, board: ReadSignal<Board>, list_id: u32) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        hover(&dnd, board, Some(OverTarget::ListSlot(list_id)), PointerHalf::Upper);
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave(dnd: DndSignals, board: ReadSignal<Board>) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        hover(&dnd, board, None, PointerHalf::Upper);
    }
}

/// Bind document keydown: Escape abandons the drag
pub fn bind_global_keydown(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && !dnd.session.with_value(|s| s.is_idle()) {
            dnd.session.update_value(|s| s.cancel());
            end_drag(&dnd);
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
        }
    }
    on_keydown.forget();
}

/// Bind global mouseup handler for drop detection. `on_drop` receives the
/// move to commit and must call [`finish_commit`] when it settles.
pub fn bind_global_mouseup<F>(dnd: DndSignals, board: ReadSignal<Board>, on_drop: F)
where
    F: Fn(PendingMove) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dropped = board
            .with_untracked(|b| dnd.session.try_update_value(|s| s.drop_card(b)))
            .flatten();
        end_drag(&dnd);
        if let Some(mv) = dropped {
            on_drop(mv);
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd, board);
    bind_global_keydown(dnd);
}
