//! Order construction engine
//!
//! Pure catalog-to-order computation: validates a customer's selection
//! against the product's option graph, resolves the price, and builds the
//! snapshot rows that get persisted. No I/O here; the caller loads the
//! catalog and persists the result inside one transaction.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::order::OrderItemCreate;
use shared::models::product::{Product, ProductStatus};
use shared::types::{Id, Price};

/// Snapshot of one selected option, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOption {
    pub category_id: Id,
    pub option_id: Id,
    pub option_name: String,
    pub category_name: String,
    pub price_adjustment: Price,
}

/// One priced line item with its product snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub product_id: Id,
    pub quantity: i32,
    /// Unit price at order creation
    pub price: Price,
    /// round2((price + sum of adjustments) * quantity)
    pub total_price: Price,
    pub product_name: String,
    pub product_description: String,
    pub product_image_url: String,
    pub options: Vec<PricedOption>,
}

/// The full priced order.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub total_price: Price,
    pub items: Vec<PricedItem>,
}

/// Validate and price an order against the loaded catalog.
///
/// `products` must contain every product the items reference, with option
/// categories and options populated, and already scoped to the caller's
/// shop. Each product must be online; each item's option selection must
/// satisfy every category of its product: at least one choice per required
/// category, at most one per non-multiple category, and every chosen option
/// must belong to one of the product's categories.
pub fn build_order(products: &[Product], items: &[OrderItemCreate]) -> AppResult<PricedOrder> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut priced_items = Vec::with_capacity(items.len());
    for item in items {
        priced_items.push(price_item(products, item)?);
    }

    let total_price = priced_items.iter().map(|i| i.total_price).sum();

    Ok(PricedOrder {
        total_price,
        items: priced_items,
    })
}

fn price_item(products: &[Product], item: &OrderItemCreate) -> AppResult<PricedItem> {
    let product = products
        .iter()
        .find(|p| p.id == item.product_id)
        .ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound)
                .with_detail("product_id", item.product_id.to_string())
        })?;

    if product.status != ProductStatus::Online {
        return Err(AppError::new(ErrorCode::ProductNotOnline)
            .with_detail("product_id", product.id.to_string())
            .with_detail("status", product.status.as_str()));
    }

    if item.quantity < 1 {
        return Err(
            AppError::validation("Quantity must be at least 1").with_detail("field", "quantity")
        );
    }

    let options = resolve_options(product, &item.option_ids)?;

    let adjustment: Price = options.iter().map(|o| o.price_adjustment).sum();
    let total_price = product.price.add(adjustment).mul_quantity(item.quantity);

    Ok(PricedItem {
        product_id: product.id,
        quantity: item.quantity,
        price: product.price,
        total_price,
        product_name: product.name.clone(),
        product_description: product.description.clone(),
        product_image_url: product.image_url.clone(),
        options,
    })
}

/// Match the selected option ids against the product's category graph and
/// snapshot the hits in display order.
fn resolve_options(product: &Product, option_ids: &[Id]) -> AppResult<Vec<PricedOption>> {
    let mut remaining: Vec<Id> = option_ids.to_vec();
    let mut snapshots = Vec::new();

    for category in &product.option_categories {
        let mut chosen = 0;
        for option in &category.options {
            let Some(pos) = remaining.iter().position(|id| *id == option.id) else {
                continue;
            };
            remaining.swap_remove(pos);
            chosen += 1;
            snapshots.push(PricedOption {
                category_id: category.id,
                option_id: option.id,
                option_name: option.name.clone(),
                category_name: category.name.clone(),
                price_adjustment: option.price_adjustment,
            });
        }

        if category.is_required && chosen == 0 {
            return Err(AppError::new(ErrorCode::RequiredCategoryUnsatisfied)
                .with_detail("category", category.name.clone()));
        }
        if !category.is_multiple && chosen > 1 {
            return Err(AppError::new(ErrorCode::MultipleChoiceNotAllowed)
                .with_detail("category", category.name.clone()));
        }
    }

    // Anything left over does not belong to this product (or is a duplicate)
    if let Some(stray) = remaining.first() {
        return Err(AppError::new(ErrorCode::OptionNotFound)
            .with_detail("option_id", stray.to_string())
            .with_detail("product_id", product.id.to_string()));
    }

    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::product::{ProductOption, ProductOptionCategory};

    fn option(id: i64, category_id: i64, name: &str, cents: i64) -> ProductOption {
        ProductOption {
            id: Id::new(id),
            category_id: Id::new(category_id),
            name: name.to_string(),
            price_adjustment: Price::from_cents(cents),
            display_order: 0,
            is_default: false,
        }
    }

    fn category(
        id: i64,
        product_id: i64,
        name: &str,
        required: bool,
        multiple: bool,
        options: Vec<ProductOption>,
    ) -> ProductOptionCategory {
        ProductOptionCategory {
            id: Id::new(id),
            product_id: Id::new(product_id),
            name: name.to_string(),
            is_required: required,
            is_multiple: multiple,
            display_order: 0,
            options,
        }
    }

    fn product(id: i64, cents: i64, categories: Vec<ProductOptionCategory>) -> Product {
        Product {
            id: Id::new(id),
            shop_id: Id::new(100),
            name: format!("Product {id}"),
            description: "tasty".to_string(),
            price: Price::from_cents(cents),
            stock: 5,
            image_url: String::new(),
            status: ProductStatus::Online,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            option_categories: categories,
        }
    }

    fn item(product_id: i64, quantity: i32, option_ids: &[i64]) -> OrderItemCreate {
        OrderItemCreate {
            product_id: Id::new(product_id),
            quantity,
            option_ids: option_ids.iter().map(|&id| Id::new(id)).collect(),
        }
    }

    /// Product 7 at 10.00 with a required single-choice category holding
    /// +1.50 and +0.00 options.
    fn catalog() -> Vec<Product> {
        vec![product(
            7,
            1000,
            vec![category(
                1,
                7,
                "Size",
                true,
                false,
                vec![option(11, 1, "Large", 150), option(12, 1, "Regular", 0)],
            )],
        )]
    }

    #[test]
    fn happy_path_pricing() {
        let products = catalog();
        let order = build_order(&products, &[item(7, 2, &[11])]).unwrap();

        assert_eq!(order.total_price, Price::from_cents(2300));
        assert_eq!(order.items.len(), 1);

        let line = &order.items[0];
        assert_eq!(line.price, Price::from_cents(1000));
        assert_eq!(line.total_price, Price::from_cents(2300));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.options.len(), 1);
        assert_eq!(line.options[0].option_name, "Large");
        assert_eq!(line.options[0].category_name, "Size");
        assert_eq!(line.options[0].price_adjustment, Price::from_cents(150));
    }

    #[test]
    fn snapshot_copies_product_text() {
        let products = catalog();
        let order = build_order(&products, &[item(7, 1, &[12])]).unwrap();
        assert_eq!(order.items[0].product_name, "Product 7");
        assert_eq!(order.items[0].product_description, "tasty");
    }

    #[test]
    fn empty_order_is_rejected() {
        let err = build_order(&catalog(), &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn required_category_must_be_satisfied() {
        let err = build_order(&catalog(), &[item(7, 1, &[])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredCategoryUnsatisfied);
    }

    #[test]
    fn single_choice_category_rejects_two_options() {
        let err = build_order(&catalog(), &[item(7, 1, &[11, 12])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::MultipleChoiceNotAllowed);
    }

    #[test]
    fn multiple_category_accepts_several_options() {
        let products = vec![product(
            7,
            1000,
            vec![category(
                1,
                7,
                "Toppings",
                false,
                true,
                vec![
                    option(21, 1, "Pearls", 50),
                    option(22, 1, "Pudding", 75),
                    option(23, 1, "Aloe", 60),
                ],
            )],
        )];
        let order = build_order(&products, &[item(7, 1, &[21, 22])]).unwrap();
        // 10.00 + 0.50 + 0.75
        assert_eq!(order.total_price, Price::from_cents(1125));
        assert_eq!(order.items[0].options.len(), 2);
    }

    #[test]
    fn foreign_option_is_rejected() {
        let err = build_order(&catalog(), &[item(7, 1, &[12, 999])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OptionNotFound);
    }

    #[test]
    fn duplicate_option_ids_are_rejected() {
        // second copy of 12 cannot be matched to any option
        let err = build_order(&catalog(), &[item(7, 1, &[12, 12])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OptionNotFound);
    }

    #[test]
    fn unknown_product_is_rejected() {
        let err = build_order(&catalog(), &[item(8, 1, &[11])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[test]
    fn offline_product_is_rejected() {
        let mut products = catalog();
        products[0].status = ProductStatus::Offline;
        let err = build_order(&products, &[item(7, 1, &[11])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotOnline);

        products[0].status = ProductStatus::Pending;
        let err = build_order(&products, &[item(7, 1, &[11])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotOnline);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = build_order(&catalog(), &[item(7, 0, &[11])]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn negative_adjustment_reduces_price() {
        let products = vec![product(
            7,
            1000,
            vec![category(
                1,
                7,
                "Size",
                true,
                false,
                vec![option(11, 1, "Small", -200)],
            )],
        )];
        let order = build_order(&products, &[item(7, 3, &[11])]).unwrap();
        // (10.00 - 2.00) * 3
        assert_eq!(order.total_price, Price::from_cents(2400));
    }

    #[test]
    fn totals_sum_across_items() {
        let mut products = catalog();
        products.push(product(8, 550, vec![]));

        let order = build_order(&products, &[item(7, 2, &[11]), item(8, 1, &[])]).unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].total_price, Price::from_cents(2300));
        assert_eq!(order.items[1].total_price, Price::from_cents(550));
        assert_eq!(order.total_price, Price::from_cents(2850));

        let summed: Price = order.items.iter().map(|i| i.total_price).sum();
        assert_eq!(order.total_price, summed);
    }

    #[test]
    fn per_item_rounding_happens_before_summing() {
        // 3.33 + 0.011 adjustment rounds at the item level
        let products = vec![product(
            9,
            333,
            vec![category(
                1,
                9,
                "Extra",
                false,
                false,
                vec![ProductOption {
                    id: Id::new(31),
                    category_id: Id::new(1),
                    name: "Half shot".to_string(),
                    price_adjustment: Price::new(rust_decimal::Decimal::new(11, 3)), // 0.011 -> 0.01
                    display_order: 0,
                    is_default: false,
                }],
            )],
        )];
        let order = build_order(&products, &[item(9, 3, &[31])]).unwrap();
        // (3.33 + 0.01) * 3 = 10.02
        assert_eq!(order.total_price, Price::from_cents(1002));
    }
}
