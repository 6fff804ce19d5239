#![cfg(test)]

mod common;

use common::{HostCall, recording_tree};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use view_tree::{
    EventData, EventDetail, LifecycleState, Listener, ModalRequest, NAVIGATED_FROM, NAVIGATING_TO,
    PageSource, SCROLL, SHOWING_MODALLY, SHOWN_MODALLY, ScrollAxis, ViewError, ViewTree,
};

fn attach_calls(calls: &[HostCall]) -> Vec<&HostCall> {
    calls
        .iter()
        .filter(|call| matches!(call, HostCall::Attach(..) | HostCall::Detach(..)))
        .collect()
}

#[test]
fn scroll_listener_attachment_follows_count_and_load_state() {
    let (mut tree, host) = recording_tree();
    let scroll = tree.create_view(tree.core().types.scroll_view).unwrap();
    let noop: Listener = Rc::new(|_tree: &mut ViewTree, _data: &EventData| {});

    let first = tree.on(scroll, SCROLL, Rc::clone(&noop)).unwrap();
    assert!(host.calls.borrow().is_empty());

    tree.load_view(scroll).unwrap();
    let second = tree.on(scroll, SCROLL, noop).unwrap();
    tree.unload_view(scroll).unwrap();
    tree.load_view(scroll).unwrap();
    tree.unload_view(scroll).unwrap();
    assert!(tree.off(scroll, SCROLL, first).unwrap());
    assert!(tree.off(scroll, SCROLL, second).unwrap());
    assert!(!tree.off(scroll, SCROLL, second).unwrap());

    let attach = HostCall::Attach(scroll, SCROLL.to_owned());
    let detach = HostCall::Detach(scroll, SCROLL.to_owned());
    let calls = host.calls.borrow();
    assert_eq!(
        attach_calls(&calls),
        [&attach, &detach, &attach, &detach]
    );
}

#[test]
fn removing_last_listener_while_loaded_detaches() {
    let (mut tree, host) = recording_tree();
    let scroll = tree.create_view(tree.core().types.scroll_view).unwrap();
    tree.load_view(scroll).unwrap();
    let id = tree
        .on(scroll, SCROLL, Rc::new(|_tree: &mut ViewTree, _data: &EventData| {}))
        .unwrap();
    tree.off(scroll, SCROLL, id).unwrap();
    tree.unload_view(scroll).unwrap();
    let calls = host.calls.borrow();
    assert_eq!(attach_calls(&calls).len(), 2);
    assert_eq!(tree.listener_count(scroll, SCROLL), 0);
}

#[test]
fn scroll_events_and_host_delegation() {
    let (mut tree, host) = recording_tree();
    let scroll = tree.create_view(tree.core().types.scroll_view).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    tree.on(
        scroll,
        SCROLL,
        Rc::new(move |_tree: &mut ViewTree, data: &EventData| {
            if let EventDetail::Scroll { scroll_y, .. } = data.detail {
                sink.borrow_mut().push(scroll_y);
            }
        }),
    )
    .unwrap();
    tree.dispatch_scroll(scroll, 0.0, 42.0).unwrap();
    assert_eq!(*seen.borrow(), [42.0]);

    tree.scroll_to_horizontal_offset(scroll, 12.0, true).unwrap();
    tree.set_local(scroll, "orientation", "horizontal").unwrap();
    let calls = host.calls.borrow();
    assert!(calls.contains(&HostCall::ScrollTo(scroll, ScrollAxis::Horizontal, 12.0)));
    assert!(calls.contains(&HostCall::Orientation(scroll, "horizontal".to_owned())));
    assert!(calls.contains(&HostCall::Layout(scroll)));
}

#[test]
fn close_modal_twice_dismisses_once() {
    let (mut tree, host) = recording_tree();
    let main = tree.create_view(tree.core().types.page).unwrap();
    let dialog = tree.create_view(tree.core().types.page).unwrap();
    tree.load_view(main).unwrap();

    let closed_with = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&closed_with);
    let presented = tree
        .show_modal(
            main,
            ModalRequest::Present {
                page: PageSource::Page(dialog),
                context: Some(json!({"user": 7})),
                on_close: Some(Rc::new(move |_tree: &mut ViewTree, args: &[Value]| {
                    sink.borrow_mut().extend_from_slice(args);
                })),
                fullscreen: true,
            },
        )
        .unwrap();
    assert_eq!(presented, dialog);
    assert_eq!(tree.modal(main), Some(dialog));
    assert_eq!(tree.modal_context(dialog), Some(json!({"user": 7})));
    assert_eq!(tree.state(dialog).unwrap(), LifecycleState::Loaded);

    assert!(tree.close_modal(dialog, &[json!("done")]).unwrap());
    assert!(!tree.close_modal(dialog, &[json!("again")]).unwrap());

    let dismissals = host.count(|call| matches!(call, HostCall::Dismiss { .. }));
    assert_eq!(dismissals, 1);
    assert_eq!(*closed_with.borrow(), [json!("done")]);
    assert_eq!(tree.modal(main), None);
    assert_eq!(tree.state(dialog).unwrap(), LifecycleState::Unloaded);
    assert!(host.calls.borrow().contains(&HostCall::Present {
        presenter: main,
        presented: dialog,
        fullscreen: true,
    }));
}

#[test]
fn modal_events_carry_context_and_closer() {
    let (mut tree, _host) = recording_tree();
    let main = tree.create_view(tree.core().types.page).unwrap();
    let dialog = tree.create_view(tree.core().types.page).unwrap();
    let order = Rc::new(RefCell::new(Vec::new()));
    for event in [SHOWING_MODALLY, SHOWN_MODALLY] {
        let sink = Rc::clone(&order);
        tree.on(
            dialog,
            event,
            Rc::new(move |tree: &mut ViewTree, data: &EventData| {
                let EventDetail::Modal { context, close } = &data.detail else {
                    return;
                };
                let is_page = tree.is_a(data.object, tree.core().types.page);
                sink.borrow_mut()
                    .push((data.event_name.clone(), context.clone(), is_page));
                if data.event_name == SHOWN_MODALLY
                    && let Some(closer) = close
                {
                    closer.close(tree, &[]).unwrap();
                }
            }),
        )
        .unwrap();
    }
    tree.show_modal(
        main,
        ModalRequest::Present {
            page: PageSource::Page(dialog),
            context: Some(json!(1)),
            on_close: None,
            fullscreen: false,
        },
    )
    .unwrap();
    assert_eq!(
        *order.borrow(),
        [
            (SHOWING_MODALLY.to_owned(), Some(json!(1)), true),
            (SHOWN_MODALLY.to_owned(), Some(json!(1)), true),
        ]
    );
    assert_eq!(tree.modal(main), None);
}

#[test]
fn close_handler_can_present_again() {
    let (mut tree, host) = recording_tree();
    let main = tree.create_view(tree.core().types.page).unwrap();
    let first = tree.create_view(tree.core().types.page).unwrap();
    let second = tree.create_view(tree.core().types.page).unwrap();
    tree.show_modal(
        main,
        ModalRequest::Present {
            page: PageSource::Page(first),
            context: None,
            on_close: Some(Rc::new(move |tree: &mut ViewTree, _args: &[Value]| {
                tree.show_modal(
                    main,
                    ModalRequest::Present {
                        page: PageSource::Page(second),
                        context: None,
                        on_close: None,
                        fullscreen: false,
                    },
                )
                .unwrap();
            })),
            fullscreen: false,
        },
    )
    .unwrap();
    tree.close_modal(first, &[]).unwrap();
    assert_eq!(tree.modal(main), Some(second));
    assert_eq!(host.count(|call| matches!(call, HostCall::Present { .. })), 2);
}

#[test]
fn modal_over_topmost_and_from_modules() {
    let (mut tree, _host) = recording_tree();
    let sheet = tree.create_view(tree.core().types.page).unwrap();
    assert_eq!(
        tree.show_modal(sheet, ModalRequest::SelfOverTopmost),
        Err(ViewError::NoTopmostPage)
    );

    let main = tree.create_view(tree.core().types.page).unwrap();
    tree.on_navigated_to(main, false).unwrap();
    assert_eq!(tree.show_modal(sheet, ModalRequest::SelfOverTopmost).unwrap(), sheet);
    assert_eq!(tree.modal(main), Some(sheet));
    assert_eq!(
        tree.show_modal(sheet, ModalRequest::SelfOverTopmost),
        Err(ViewError::ModalAlreadyShown)
    );
    tree.close_modal(sheet, &[]).unwrap();

    tree.register_page_module(
        "settings",
        Rc::new(|tree: &mut ViewTree| tree.create_view(tree.core().types.page)),
    );
    let settings = tree
        .show_modal(
            main,
            ModalRequest::Present {
                page: PageSource::Module("settings".to_owned()),
                context: None,
                on_close: None,
                fullscreen: false,
            },
        )
        .unwrap();
    assert_eq!(tree.modal(main), Some(settings));

    let label = tree.create_view(tree.core().types.view).unwrap();
    assert_eq!(
        tree.show_modal(label, ModalRequest::SelfOverTopmost),
        Err(ViewError::NotAPage)
    );
}

#[test]
fn back_navigation_keeps_the_binding_context() {
    let (mut tree, _host) = recording_tree();
    let page = tree.create_view(tree.core().types.page).unwrap();
    let label = tree.create_view(tree.core().types.view).unwrap();
    tree.set_content(page, Some(label)).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for event in [NAVIGATING_TO, NAVIGATED_FROM] {
        let sink = Rc::clone(&seen);
        tree.on(
            page,
            event,
            Rc::new(move |_tree: &mut ViewTree, data: &EventData| {
                if let EventDetail::Navigation {
                    context,
                    is_back_navigation,
                } = &data.detail
                {
                    sink.borrow_mut().push((context.clone(), *is_back_navigation));
                }
            }),
        )
        .unwrap();
    }

    tree.on_navigating_to(page, Some(json!("ctx")), false, Some(json!({"name": "a"})))
        .unwrap();
    assert_eq!(tree.binding_context(label), Some(json!({"name": "a"})));
    tree.on_navigating_to(page, None, true, Some(json!({"name": "b"})))
        .unwrap();
    assert_eq!(tree.binding_context(label), Some(json!({"name": "a"})));
    tree.on_navigated_from(page, true).unwrap();

    assert_eq!(
        *seen.borrow(),
        [(Some(json!("ctx")), false), (None, true), (None, true)]
    );
}

#[test]
fn disposed_nodes_reject_operations() {
    let (mut tree, _host) = recording_tree();
    let page = tree.create_view(tree.core().types.page).unwrap();
    let label = tree.create_view(tree.core().types.view).unwrap();
    tree.set_content(page, Some(label)).unwrap();
    tree.load_view(page).unwrap();
    tree.on_navigated_to(page, false).unwrap();

    tree.dispose(page).unwrap();
    assert_eq!(tree.state(label), Err(ViewError::Disposed));
    assert_eq!(tree.set_local(label, "opacity", "1"), Err(ViewError::Disposed));
    assert_eq!(tree.dispose(page), Err(ViewError::Disposed));
    assert_eq!(tree.topmost_page(), None);
    assert!(!tree.contains(page));
}

#[test]
fn disposing_a_shown_modal_frees_the_presenter() {
    let (mut tree, host) = recording_tree();
    let main = tree.create_view(tree.core().types.page).unwrap();
    let dialog = tree.create_view(tree.core().types.page).unwrap();
    let other = tree.create_view(tree.core().types.page).unwrap();
    let closed = Rc::new(RefCell::new(0_u32));
    let sink = Rc::clone(&closed);
    tree.show_modal(
        main,
        ModalRequest::Present {
            page: PageSource::Page(dialog),
            context: None,
            on_close: Some(Rc::new(move |_tree: &mut ViewTree, _args: &[Value]| {
                *sink.borrow_mut() += 1;
            })),
            fullscreen: false,
        },
    )
    .unwrap();

    tree.dispose(dialog).unwrap();
    assert_eq!(tree.modal(main), None);
    assert_eq!(*closed.borrow(), 0);
    assert_eq!(host.count(|call| matches!(call, HostCall::Dismiss { .. })), 1);
    assert_eq!(tree.close_modal(dialog, &[]), Err(ViewError::Disposed));

    let shown = tree
        .show_modal(
            main,
            ModalRequest::Present {
                page: PageSource::Page(other),
                context: None,
                on_close: None,
                fullscreen: false,
            },
        )
        .unwrap();
    assert_eq!(tree.modal(main), Some(shown));
}

#[test]
fn rejected_appends_leave_the_tree_unchanged() {
    let (mut tree, _host) = recording_tree();
    let root = tree.create_view(tree.core().types.content_view).unwrap();
    let mid = tree.create_view(tree.core().types.content_view).unwrap();
    let leaf = tree.create_view(tree.core().types.content_view).unwrap();
    tree.set_content(root, Some(mid)).unwrap();
    tree.set_content(mid, Some(leaf)).unwrap();
    tree.load_view(root).unwrap();

    assert!(matches!(
        tree.append_child(leaf, mid),
        Err(ViewError::InvalidChildAssignment(_))
    ));
    assert!(matches!(
        tree.append_child(mid, mid),
        Err(ViewError::InvalidChildAssignment(_))
    ));
    assert!(matches!(
        tree.set_content(mid, Some(root)),
        Err(ViewError::InvalidChildAssignment(_))
    ));

    assert_eq!(tree.parent_node(mid), Some(root));
    assert_eq!(tree.content(root), Some(mid));
    assert_eq!(tree.content(mid), Some(leaf));
    assert_eq!(tree.parent_node(leaf), Some(mid));
    for node in [root, mid, leaf] {
        assert_eq!(tree.state(node).unwrap(), LifecycleState::Loaded);
    }
}

#[test]
fn reparenting_moves_loaded_children() {
    let (mut tree, _host) = recording_tree();
    let left = tree.create_view(tree.core().types.content_view).unwrap();
    let right = tree.create_view(tree.core().types.content_view).unwrap();
    let child = tree.create_view(tree.core().types.view).unwrap();
    tree.load_view(left).unwrap();
    tree.set_content(left, Some(child)).unwrap();
    assert_eq!(tree.state(child).unwrap(), LifecycleState::Loaded);

    tree.set_content(right, Some(child)).unwrap();
    assert_eq!(tree.state(child).unwrap(), LifecycleState::Unloaded);
    assert_eq!(tree.content(left), None);
    assert_eq!(tree.content(right), Some(child));
    assert_eq!(tree.parent_node(child), Some(right));
}
