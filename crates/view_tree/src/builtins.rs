//! Core node types and their properties.

use crate::{Platform, Registry, ViewTree};
use indextree::NodeId;
use std::rc::Rc;
use view_properties::converters::{boolean, color, keyword_converter, number};
use view_properties::{
    CssProperty, Property, PropertyBuilder as _, PropertyId, PropertyValue, RegistrationError,
    TypeTag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreTypes {
    pub view: TypeTag,
    /// Holds at most one content child.
    pub content_view: TypeTag,
    pub page: TypeTag,
    pub action_bar: TypeTag,
    pub scroll_view: TypeTag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreProperties {
    pub color: PropertyId,
    pub background_color: PropertyId,
    pub font_size: PropertyId,
    pub opacity: PropertyId,
    pub visibility: PropertyId,
    pub action_bar_hidden: PropertyId,
    pub background_span_under_status_bar: PropertyId,
    pub enable_swipe_back_navigation: PropertyId,
    pub status_bar_style: PropertyId,
    pub android_status_bar_background: PropertyId,
    pub orientation: PropertyId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Core {
    pub types: CoreTypes,
    pub properties: CoreProperties,
}

const VISIBILITY: &[&str] = &["visible", "collapse", "hidden"];
const STATUS_BAR_STYLE: &[&str] = &["light", "dark"];
const ORIENTATION: &[&str] = &["horizontal", "vertical"];

/// Define the core types and register their properties.
///
/// # Errors
/// Fails if any of the core names is already taken in `registry`.
pub fn register_core(registry: &mut Registry, platform: Platform) -> Result<Core, RegistrationError> {
    let view = registry.define_type("View", None)?;
    let content_view = registry.define_type("ContentView", Some(view))?;
    let page = registry.define_type("Page", Some(content_view))?;
    let action_bar = registry.define_type("ActionBar", Some(view))?;
    let scroll_view = registry.define_type("ScrollView", Some(content_view))?;
    let ios = platform == Platform::Ios;

    let properties = CoreProperties {
        color: CssProperty::new("color", "color")
            .converter(color())
            .inherited(true)
            .register(registry, view)?,
        background_color: CssProperty::new("backgroundColor", "background-color")
            .converter(color())
            .register(registry, view)?,
        font_size: CssProperty::new("fontSize", "font-size")
            .converter(number())
            .inherited(true)
            .affects_layout(true)
            .register(registry, view)?,
        opacity: CssProperty::new("opacity", "opacity")
            .converter(number())
            .default_value(1.0)
            .register(registry, view)?,
        visibility: CssProperty::new("visibility", "visibility")
            .converter(keyword_converter(VISIBILITY))
            .default_value("visible")
            .affects_layout(true)
            .register(registry, view)?,
        action_bar_hidden: Property::new("actionBarHidden")
            .converter(boolean())
            .affects_layout(ios)
            .register(registry, page)?,
        background_span_under_status_bar: Property::new("backgroundSpanUnderStatusBar")
            .converter(boolean())
            .default_value(false)
            .affects_layout(ios)
            .register(registry, page)?,
        enable_swipe_back_navigation: Property::new("enableSwipeBackNavigation")
            .converter(boolean())
            .default_value(true)
            .register(registry, page)?,
        status_bar_style: CssProperty::new("statusBarStyle", "status-bar-style")
            .converter(keyword_converter(STATUS_BAR_STYLE))
            .register(registry, page)?,
        android_status_bar_background: CssProperty::new(
            "androidStatusBarBackground",
            "android-status-bar-background",
        )
        .converter(color())
        .equality(Rc::new(|left: &PropertyValue, right: &PropertyValue| {
            left.as_color() == right.as_color()
        }))
        .register(registry, page)?,
        orientation: CssProperty::<ViewTree, NodeId>::new("orientation", "orientation")
            .converter(keyword_converter(ORIENTATION))
            .default_value("vertical")
            .affects_layout(true)
            .on_changed(Rc::new(
                |tree: &mut ViewTree,
                 node: NodeId,
                 _old: Option<&PropertyValue>,
                 new: Option<&PropertyValue>| {
                    let orientation = new.and_then(PropertyValue::as_text).unwrap_or("vertical");
                    tree.host_mut().orientation_changed(node, orientation);
                },
            ))
            .register(registry, scroll_view)?,
    };

    Ok(Core {
        types: CoreTypes {
            view,
            content_view,
            page,
            action_bar,
            scroll_view,
        },
        properties,
    })
}
