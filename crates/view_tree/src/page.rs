//! Pages: stylesheets, slots and navigation.

use crate::ViewTree;
use crate::error::ViewError;
use crate::events::{
    EventData, EventDetail, NAVIGATED_FROM, NAVIGATED_TO, NAVIGATING_FROM, NAVIGATING_TO,
};
use anyhow::Result;
use css_orchestrator::{AddCssReport, KeyframeAnimationInfo};
use indextree::NodeId;
use log::{debug, trace};
use serde_json::Value;
use std::rc::Rc;

/// Builds the root page of a page module.
pub type PageFactory = Rc<dyn Fn(&mut ViewTree) -> Result<NodeId, ViewError>>;

impl ViewTree {
    /// Make `name` resolvable by [`crate::PageSource::Module`].
    pub fn register_page_module(&mut self, name: &str, factory: PageFactory) {
        self.page_factories.insert(name.to_owned(), factory);
    }

    /// Build a page from a registered module.
    ///
    /// # Errors
    /// [`ViewError::UnknownPageModule`] if `name` was never registered, or
    /// [`ViewError::NotAPage`] if the factory produced something else.
    pub fn create_page(&mut self, name: &str) -> Result<NodeId, ViewError> {
        let factory = self
            .page_factories
            .get(name)
            .map(Rc::clone)
            .ok_or_else(|| ViewError::UnknownPageModule(name.to_owned()))?;
        let page = factory(self)?;
        self.page_state(page)?;
        debug!(target: "lifecycle", "created page {page:?} from module `{name}`");
        Ok(page)
    }

    /// Accumulated stylesheet text of the page scope.
    ///
    /// # Errors
    /// Fails if `page` owns no scope.
    pub fn page_css(&self, page: NodeId) -> Result<String, ViewError> {
        Ok(self.style_scope(page)?.css())
    }

    /// Replace every rule of the page scope with `text`.
    ///
    /// Previously loaded files are forgotten, so they can be loaded again.
    ///
    /// # Errors
    /// Fails if `page` owns no scope.
    pub fn set_page_css(&mut self, page: NodeId, text: &str) -> Result<AddCssReport, ViewError> {
        let slot = self.scope_slot_mut(page)?;
        slot.css_files.clear();
        let report = slot.scope.set_css(text);
        self.refresh_css(page)?;
        Ok(report)
    }

    /// Append `text` to the page scope and restyle the page if loaded.
    ///
    /// # Errors
    /// Fails if `page` owns no scope.
    pub fn add_css(&mut self, page: NodeId, text: &str) -> Result<AddCssReport, ViewError> {
        let report = self.scope_slot_mut(page)?.scope.add_css(text, None);
        self.refresh_css(page)?;
        Ok(report)
    }

    /// Load a stylesheet file into the page scope. `~/` resolves against the
    /// configured application root. Each resolved path is loaded at most once.
    ///
    /// Returns whether rules were added. Missing and empty files are skipped.
    ///
    /// # Errors
    /// Fails if the node owns no scope or the file exists but cannot be read.
    pub fn add_css_file(&mut self, page: NodeId, path: &str) -> Result<bool> {
        let resolved = self.config.resolve_app_path(path);
        let slot = self.scope_slot_mut(page)?;
        if slot.css_files.contains(&resolved) {
            trace!(target: "style_scope", "{} already loaded", resolved.display());
            return Ok(false);
        }
        let Some(_report) = slot.scope.add_css_file(&resolved)? else {
            return Ok(false);
        };
        slot.css_files.insert(resolved);
        self.refresh_css(page)?;
        Ok(true)
    }

    /// Run the cascade of `page` if it is loaded.
    ///
    /// # Errors
    /// Fails if `page` owns no scope.
    pub fn refresh_css(&mut self, page: NodeId) -> Result<(), ViewError> {
        if self.view(page)?.is_loaded() {
            self.apply_cascade(page)?;
        }
        Ok(())
    }

    /// # Errors
    /// Fails if `page` owns no scope.
    pub fn keyframe_animation(
        &self,
        page: NodeId,
        name: &str,
    ) -> Result<Option<KeyframeAnimationInfo>, ViewError> {
        Ok(self.style_scope(page)?.keyframe_animation(name).cloned())
    }

    /// The page action bar, created and attached on first access.
    ///
    /// # Errors
    /// Fails if `page` is not a page.
    pub fn action_bar(&mut self, page: NodeId) -> Result<NodeId, ViewError> {
        if let Some(bar) = self.page_state(page)?.action_bar {
            return Ok(bar);
        }
        let bar = self.create_view(self.core.types.action_bar)?;
        self.set_action_bar(page, Some(bar))?;
        Ok(bar)
    }

    /// Replace the page action bar. The previous bar is detached.
    ///
    /// # Errors
    /// [`ViewError::InvalidChildAssignment`] for `None` or a node that is not an action bar.
    pub fn set_action_bar(&mut self, page: NodeId, bar: Option<NodeId>) -> Result<(), ViewError> {
        let Some(bar) = bar else {
            return Err(ViewError::InvalidChildAssignment(
                "action bar cannot be null".to_owned(),
            ));
        };
        if !self.is_a(bar, self.core.types.action_bar) {
            return Err(ViewError::InvalidChildAssignment(
                "expected an ActionBar".to_owned(),
            ));
        }
        let previous = self.page_state(page)?.action_bar;
        if previous == Some(bar) {
            return Ok(());
        }
        self.check_append(page, bar)?;
        if let Some(old) = previous {
            self.remove_child(page, old)?;
        }
        self.append_child(page, bar)?;
        self.page_state_mut(page)?.action_bar = Some(bar);
        Ok(())
    }

    pub fn content(&self, node: NodeId) -> Option<NodeId> {
        self.view(node).ok()?.content
    }

    /// Replace the single content child of a content view.
    ///
    /// # Errors
    /// [`ViewError::InvalidChildAssignment`] if `node` cannot hold content.
    pub fn set_content(&mut self, node: NodeId, content: Option<NodeId>) -> Result<(), ViewError> {
        if !self.is_a(node, self.core.types.content_view) {
            return Err(ViewError::InvalidChildAssignment(format!(
                "`{}` has no content slot",
                self.view(node)?.type_name
            )));
        }
        let previous = self.view(node)?.content;
        if previous == content {
            return Ok(());
        }
        if let Some(new) = content {
            self.check_append(node, new)?;
        }
        if let Some(old) = previous {
            self.remove_child(node, old)?;
        }
        if let Some(new) = content {
            self.append_child(node, new)?;
            self.view_mut(node)?.content = Some(new);
        }
        Ok(())
    }

    /// Route a built child into the action bar slot of a page or the content slot.
    ///
    /// # Errors
    /// See [`Self::set_action_bar`] and [`Self::set_content`].
    pub fn add_child_from_builder(&mut self, node: NodeId, child: NodeId) -> Result<(), ViewError> {
        if self.is_a(child, self.core.types.action_bar) && self.page_state(node).is_ok() {
            self.set_action_bar(node, Some(child))
        } else {
            self.set_content(node, Some(child))
        }
    }

    pub fn navigation_context(&self, page: NodeId) -> Option<Value> {
        self.page_state(page).ok()?.navigation_context.clone()
    }

    /// Store the navigation context and raise `navigatingTo`.
    ///
    /// The binding context is replaced only on forward navigation with a non-null value.
    ///
    /// # Errors
    /// Fails if `page` is not a page.
    pub fn on_navigating_to(
        &mut self,
        page: NodeId,
        context: Option<Value>,
        is_back_navigation: bool,
        binding_context: Option<Value>,
    ) -> Result<(), ViewError> {
        self.page_state_mut(page)?.navigation_context = context;
        if !is_back_navigation
            && let Some(binding) = binding_context.filter(|value| !value.is_null())
        {
            self.set_binding_context(page, Some(binding))?;
        }
        self.raise_navigation(page, NAVIGATING_TO, is_back_navigation);
        Ok(())
    }

    /// Raise `navigatedTo` and make `page` the topmost page.
    ///
    /// # Errors
    /// Fails if `page` is not a page.
    pub fn on_navigated_to(&mut self, page: NodeId, is_back_navigation: bool) -> Result<(), ViewError> {
        self.set_topmost_page(Some(page))?;
        self.raise_navigation(page, NAVIGATED_TO, is_back_navigation);
        Ok(())
    }

    /// # Errors
    /// Fails if `page` is not a page.
    pub fn on_navigating_from(&mut self, page: NodeId, is_back_navigation: bool) -> Result<(), ViewError> {
        self.page_state(page)?;
        self.raise_navigation(page, NAVIGATING_FROM, is_back_navigation);
        Ok(())
    }

    /// Raise `navigatedFrom`, then forget the navigation context.
    ///
    /// # Errors
    /// Fails if `page` is not a page.
    pub fn on_navigated_from(&mut self, page: NodeId, is_back_navigation: bool) -> Result<(), ViewError> {
        self.page_state(page)?;
        self.raise_navigation(page, NAVIGATED_FROM, is_back_navigation);
        self.page_state_mut(page)?.navigation_context = None;
        Ok(())
    }

    fn raise_navigation(&mut self, page: NodeId, event: &str, is_back_navigation: bool) {
        trace!(target: "lifecycle", "{event} on {page:?} (back: {is_back_navigation})");
        let data = EventData::new(
            event,
            page,
            EventDetail::Navigation {
                context: self.navigation_context(page),
                is_back_navigation,
            },
        );
        self.notify(&data);
    }
}
