//! Modal presentation of pages.
//!
//! The presenter remembers the page it shows. The shown page owns a
//! session holding the context and the one-shot close handler; closing
//! takes the session out before anything else happens, so a second close is a
//! no-op even when issued from inside the close handler.

use crate::ViewTree;
use crate::error::ViewError;
use crate::events::{EventData, EventDetail, SHOWING_MODALLY, SHOWN_MODALLY};
use indextree::NodeId;
use log::{debug, trace};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Receives the arguments passed to [`ViewTree::close_modal`].
pub type CloseHandler = Rc<dyn Fn(&mut ViewTree, &[Value])>;

/// Page to present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageSource {
    Page(NodeId),
    /// Name registered with [`ViewTree::register_page_module`].
    Module(String),
}

pub enum ModalRequest {
    /// Present the calling page over the topmost page.
    SelfOverTopmost,
    /// Present another page over the calling page.
    Present {
        page: PageSource,
        context: Option<Value>,
        on_close: Option<CloseHandler>,
        fullscreen: bool,
    },
}

pub(crate) struct ModalSession {
    pub presenter: NodeId,
    pub context: Option<Value>,
    pub on_close: Option<CloseHandler>,
}

/// Closes the modal page it was issued for. Closing more than once does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModalCloser {
    presented: NodeId,
}

impl ModalCloser {
    pub const fn presented(&self) -> NodeId {
        self.presented
    }

    /// # Errors
    /// See [`ViewTree::close_modal`].
    pub fn close(self, tree: &mut ViewTree, args: &[Value]) -> Result<bool, ViewError> {
        tree.close_modal(self.presented, args)
    }
}

impl fmt::Debug for ModalRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfOverTopmost => formatter.write_str("SelfOverTopmost"),
            Self::Present {
                page,
                context,
                on_close,
                fullscreen,
            } => formatter
                .debug_struct("Present")
                .field("page", page)
                .field("context", context)
                .field("on_close", &on_close.is_some())
                .field("fullscreen", fullscreen)
                .finish(),
        }
    }
}

impl ViewTree {
    /// Present a page modally and return the presented page.
    ///
    /// # Errors
    /// [`ViewError::NotAPage`] if a participant is not a page,
    /// [`ViewError::NoTopmostPage`] for [`ModalRequest::SelfOverTopmost`] without a topmost page,
    /// [`ViewError::UnknownPageModule`] for unresolved modules and
    /// [`ViewError::ModalAlreadyShown`] if the presenter already shows a modal
    /// or the presented page is already shown.
    pub fn show_modal(&mut self, node: NodeId, request: ModalRequest) -> Result<NodeId, ViewError> {
        self.page_state(node)?;
        let (presenter, presented, context, on_close, fullscreen) = match request {
            ModalRequest::SelfOverTopmost => {
                let topmost = self.topmost_page.ok_or(ViewError::NoTopmostPage)?;
                (topmost, node, None, None, false)
            }
            ModalRequest::Present {
                page,
                context,
                on_close,
                fullscreen,
            } => {
                let presented = match page {
                    PageSource::Page(page) => page,
                    PageSource::Module(name) => self.create_page(&name)?,
                };
                (node, presented, context, on_close, fullscreen)
            }
        };
        if presenter == presented {
            return Err(ViewError::ModalAlreadyShown);
        }
        if self.page_state(presenter)?.modal.is_some() || self.page_state(presented)?.session.is_some() {
            return Err(ViewError::ModalAlreadyShown);
        }

        self.page_state_mut(presenter)?.modal = Some(presented);
        self.page_state_mut(presented)?.session = Some(ModalSession {
            presenter,
            context: context.clone(),
            on_close,
        });
        let closer = ModalCloser { presented };
        debug!(target: "modal", "{presenter:?} presents {presented:?}");

        self.raise_modal(presented, SHOWING_MODALLY, context.clone(), closer);
        self.host.present_modal(presenter, presented, fullscreen);
        self.load_view(presented)?;
        self.raise_modal(presented, SHOWN_MODALLY, context, closer);
        Ok(presented)
    }

    /// Close the modal page `node` and forward `args` to its close handler.
    /// Returns false if `node` is not shown modally.
    ///
    /// # Errors
    /// Fails for dead handles.
    pub fn close_modal(&mut self, node: NodeId, args: &[Value]) -> Result<bool, ViewError> {
        let Some(session) = self.page_state_mut(node)?.session.take() else {
            trace!(target: "modal", "{node:?} is not shown modally");
            return Ok(false);
        };
        let ModalSession {
            presenter,
            on_close,
            ..
        } = session;
        if let Ok(state) = self.page_state_mut(presenter)
            && state.modal == Some(node)
        {
            state.modal = None;
        }
        self.host.dismiss_modal(presenter, node);
        self.unload_view(node)?;
        debug!(target: "modal", "{presenter:?} dismissed {node:?}");
        if let Some(handler) = on_close {
            handler(self, args);
        }
        Ok(true)
    }

    /// Dismiss `page` if it is shown modally, without running its close handler.
    pub(crate) fn drop_modal_session(&mut self, page: NodeId) -> Result<(), ViewError> {
        let Some(session) = self
            .view_mut(page)?
            .page
            .as_deref_mut()
            .and_then(|state| state.session.take())
        else {
            return Ok(());
        };
        if let Ok(state) = self.page_state_mut(session.presenter)
            && state.modal == Some(page)
        {
            state.modal = None;
        }
        self.host.dismiss_modal(session.presenter, page);
        debug!(target: "modal", "{page:?} dropped while shown by {:?}", session.presenter);
        Ok(())
    }

    /// Page currently presented by `presenter`.
    pub fn modal(&self, presenter: NodeId) -> Option<NodeId> {
        self.page_state(presenter).ok()?.modal
    }

    /// Context the page was shown with, while it is shown modally.
    pub fn modal_context(&self, page: NodeId) -> Option<Value> {
        self.page_state(page).ok()?.session.as_ref()?.context.clone()
    }

    fn raise_modal(&mut self, page: NodeId, event: &str, context: Option<Value>, closer: ModalCloser) {
        let data = EventData::new(
            event,
            page,
            EventDetail::Modal {
                context,
                close: Some(closer),
            },
        );
        self.notify(&data);
    }
}
