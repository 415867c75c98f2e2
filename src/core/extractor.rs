use crate::domain::model::{AttributeKind, Ingredient, Order};

/// 依屬性種類取出訂單中的所有屬性值
///
/// 依漢堡順序、再依配料順序產生。缺少的值會以空字串表示，交給計數器拒絕。
pub fn extract(order: &Order, kind: AttributeKind) -> Box<dyn Iterator<Item = &str> + '_> {
    match kind {
        AttributeKind::BurgerName => Box::new(
            order
                .burgers
                .iter()
                .map(|burger| burger.name.as_deref().unwrap_or_default()),
        ),
        AttributeKind::IngredientName => Box::new(
            ingredients(order).map(|ingredient| ingredient.name.as_deref().unwrap_or_default()),
        ),
        AttributeKind::IngredientPrice => Box::new(ingredients(order).map(|ingredient| {
            ingredient
                .unit_price
                .as_ref()
                .map(|price| price.as_str())
                .unwrap_or_default()
        })),
    }
}

fn ingredients(order: &Order) -> impl Iterator<Item = &Ingredient> {
    order
        .burgers
        .iter()
        .flat_map(|burger| burger.ingredients.iter())
}
