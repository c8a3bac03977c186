use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::require_admin;
use crate::error::{PosError, PosResult};
use crate::models::User;
use crate::store::{keys, Store};

pub const DEFAULT_MENU_ORDER: [&str; 8] = [
    "home",
    "pos",
    "sales",
    "expenses",
    "shifts",
    "statistics",
    "inventory",
    "control-panel",
];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Stored order, dropping unknown ids and appending any missing ones.
pub fn menu_order(store: &Store) -> PosResult<Vec<String>> {
    Ok(repair_order(store.view(keys::MENU_ORDER)?))
}

fn repair_order(stored: Vec<String>) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(DEFAULT_MENU_ORDER.len());
    for id in stored {
        if DEFAULT_MENU_ORDER.contains(&id.as_str()) && !order.contains(&id) {
            order.push(id);
        }
    }
    for id in DEFAULT_MENU_ORDER {
        if !order.iter().any(|o| o == id) {
            order.push(id.to_string());
        }
    }
    order
}

/// Swap an entry with its neighbour. Moving past either end is a no-op.
pub fn move_menu_item(
    store: &Store,
    actor: &User,
    id: &str,
    direction: Direction,
) -> PosResult<Vec<String>> {
    require_admin(actor, "change the menu order")?;
    let mut order = repair_order(store.load_or_default(keys::MENU_ORDER)?);
    let index = order
        .iter()
        .position(|o| o == id)
        .ok_or_else(|| PosError::NotFound(format!("menu item {id}")))?;

    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < order.len() => index + 1,
        _ => return Ok(order),
    };
    order.swap(index, target);
    store.save(keys::MENU_ORDER, &order)?;

    info!(id, ?direction, "menu order updated");
    Ok(order)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub warning: String,
    pub card: String,
}

impl Colors {
    fn new(primary: &str, secondary: &str, accent: &str, warning: &str, card: &str) -> Self {
        Colors {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            accent: accent.to_string(),
            warning: warning.to_string(),
            card: card.to_string(),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Colors::new("#9b87f5", "#7E69AB", "#D946EF", "#F97316", "rgba(26, 31, 44, 0.8)")
    }
}

pub const PALETTES: [&str; 3] = ["default", "pastel", "vivid"];

pub fn palette(name: &str) -> Option<Colors> {
    match name {
        "default" => Some(Colors::default()),
        "pastel" => Some(Colors::new(
            "#E5DEFF",
            "#FEC6A1",
            "#FFDEE2",
            "#FEF7CD",
            "rgba(242, 252, 226, 0.8)",
        )),
        "vivid" => Some(Colors::new(
            "#8B5CF6",
            "#0EA5E9",
            "#D946EF",
            "#F97316",
            "rgba(26, 31, 44, 0.9)",
        )),
        _ => None,
    }
}

pub fn selected_palette(store: &Store) -> PosResult<String> {
    let stored: Option<String> = store.view(keys::SELECTED_PALETTE)?;
    Ok(stored
        .filter(|name| palette(name).is_some())
        .unwrap_or_else(|| "default".to_string()))
}

pub fn select_palette(store: &Store, actor: &User, name: &str) -> PosResult<Colors> {
    require_admin(actor, "change the palette")?;
    let colors = palette(name)
        .ok_or_else(|| PosError::Validation(format!("unknown palette: {name}")))?;
    store.save(keys::SELECTED_PALETTE, name)?;

    info!(palette = name, "palette selected");
    Ok(colors)
}

pub fn custom_colors(store: &Store) -> PosResult<Colors> {
    store.view(keys::CUSTOM_COLORS)
}

pub fn save_custom_colors(store: &Store, actor: &User, colors: &Colors) -> PosResult<()> {
    require_admin(actor, "change the colors")?;
    let fields = [
        &colors.primary,
        &colors.secondary,
        &colors.accent,
        &colors.warning,
        &colors.card,
    ];
    if fields.iter().any(|c| c.trim().is_empty()) {
        return Err(PosError::Validation("every color needs a value".to_string()));
    }
    store.save(keys::CUSTOM_COLORS, colors)
}

pub fn reset_custom_colors(store: &Store, actor: &User) -> PosResult<Colors> {
    require_admin(actor, "change the colors")?;
    store.remove(keys::CUSTOM_COLORS)?;
    Ok(Colors::default())
}
