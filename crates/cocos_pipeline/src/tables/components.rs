//! Settable properties of the editor's built-in components.

const NODE: &[&str] = &[
    "position", "scale", "angle", "layer", "mobility", "name", "active", "parent",
];

const UI_TRANSFORM: &[&str] = &["contentSize", "anchorPoint", "priority"];

const SPRITE: &[&str] = &[
    "color",
    "spriteFrame",
    "type",
    "fillType",
    "fillCenter",
    "fillStart",
    "fillRange",
    "trim",
    "grayscale",
    "sizeMode",
    "spriteAtlas",
    "customMaterial",
    "sharedMaterials",
];

const LABEL: &[&str] = &[
    "string",
    "fontSize",
    "color",
    "lineHeight",
    "horizontalAlign",
    "verticalAlign",
    "spacingX",
    "overflow",
    "enableWrapText",
    "useSystemFont",
    "fontFamily",
    "font",
    "cacheMode",
    "isBold",
    "isItalic",
    "isUnderline",
    "underlineHeight",
    "enableOutline",
    "outlineColor",
    "outlineWidth",
    "enableShadow",
    "shadowColor",
    "shadowOffset",
    "shadowBlur",
];

const BUTTON: &[&str] = &[
    "interactable",
    "transition",
    "normalColor",
    "pressedColor",
    "hoverColor",
    "disabledColor",
    "normalSprite",
    "pressedSprite",
    "hoverSprite",
    "disabledSprite",
    "duration",
    "zoomScale",
    "target",
    "clickEvents",
];

const WIDGET: &[&str] = &[
    "top",
    "bottom",
    "left",
    "right",
    "horizontalCenter",
    "verticalCenter",
    "isAbsoluteTop",
    "isAbsoluteBottom",
    "isAbsoluteLeft",
    "isAbsoluteRight",
    "isAbsoluteHorizontalCenter",
    "isAbsoluteVerticalCenter",
    "target",
    "alignMode",
];

const LAYOUT: &[&str] = &[
    "type",
    "resizeMode",
    "cellSize",
    "startAxis",
    "horizontalDirection",
    "verticalDirection",
    "paddingLeft",
    "paddingRight",
    "paddingTop",
    "paddingBottom",
    "spacingX",
    "spacingY",
    "affectedByScale",
    "autoResize",
];

const MASK: &[&str] = &["type", "inverted", "segments", "spriteFrame"];

/// Node-level pseudo component; its properties have no `__comps__` prefix.
pub const NODE_COMPONENT: &str = "cc.Node";

/// Known properties of a built-in component, `None` for anything else.
pub fn builtin_properties(component: &str) -> Option<&'static [&'static str]> {
    match component {
        NODE_COMPONENT => Some(NODE),
        "cc.UITransform" => Some(UI_TRANSFORM),
        "cc.Sprite" => Some(SPRITE),
        "cc.Label" => Some(LABEL),
        "cc.Button" => Some(BUTTON),
        "cc.Widget" => Some(WIDGET),
        "cc.Layout" => Some(LAYOUT),
        "cc.Mask" => Some(MASK),
        _ => None,
    }
}

pub fn is_builtin_component(component: &str) -> bool {
    builtin_properties(component).is_some()
}
