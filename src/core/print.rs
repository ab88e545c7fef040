//! Work-order document rendering
//!
//! The print document of a vehicle is rendered through templates embedded in
//! the binary. Money is formatted before it reaches the template so both
//! formats show identical figures.

use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;

use crate::core::error::{ShopError, ShopResult};
use crate::core::store::PrintDocument;
use crate::core::Config;
use crate::entities::TIMESTAMP_FORMAT;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Output format of a printed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DocumentFormat {
    #[default]
    Html,
    Text,
}

impl DocumentFormat {
    fn template(&self) -> &'static str {
        match self {
            DocumentFormat::Html => "work_order.html",
            DocumentFormat::Text => "work_order.txt",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Text => "txt",
        }
    }
}

#[derive(Serialize)]
struct ClientBlock<'a> {
    full_name: &'a str,
    phone: &'a str,
    email: Option<&'a str>,
}

#[derive(Serialize)]
struct CarBlock<'a> {
    title: String,
    vin: &'a str,
}

#[derive(Serialize)]
struct LineBlock<'a> {
    name: &'a str,
    quantity: i64,
    price: String,
    total: String,
}

#[derive(Serialize)]
struct OrderBlock<'a> {
    id: i64,
    created_at: String,
    status: &'static str,
    description: &'a str,
    lines: Vec<LineBlock<'a>>,
    labor_cost: String,
    parts_total: String,
    total: String,
}

/// Renders print documents with the embedded templates
pub struct DocumentRenderer {
    tera: Tera,
}

impl DocumentRenderer {
    pub fn new() -> ShopResult<Self> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let source = std::str::from_utf8(&content.data)
                    .map_err(|e| ShopError::Template(format!("{}: {}", filename, e)))?;
                tera.add_raw_template(filename, source)
                    .map_err(|e| ShopError::Template(e.to_string()))?;
            }
        }

        Ok(Self { tera })
    }

    /// Render a vehicle's order history
    pub fn render(
        &self,
        doc: &PrintDocument,
        format: DocumentFormat,
        config: &Config,
    ) -> ShopResult<String> {
        let orders: Vec<OrderBlock<'_>> = doc
            .orders
            .iter()
            .map(|printed| OrderBlock {
                id: printed.order.id,
                created_at: printed.order.created_at.format(TIMESTAMP_FORMAT).to_string(),
                status: printed.order.status.label(),
                description: &printed.order.description,
                lines: printed
                    .lines
                    .iter()
                    .map(|line| LineBlock {
                        name: &line.name,
                        quantity: line.quantity,
                        price: config.money(line.price),
                        total: config.money(line.total()),
                    })
                    .collect(),
                labor_cost: config.money(printed.order.labor_cost),
                parts_total: config.money(printed.parts_total),
                total: config.money(printed.total),
            })
            .collect();

        let mut context = tera::Context::new();
        context.insert("shop_name", config.shop_name());
        context.insert("printed_on", &doc.printed_on.format("%Y-%m-%d").to_string());
        context.insert(
            "client",
            &ClientBlock {
                full_name: &doc.client.full_name,
                phone: &doc.client.phone,
                email: doc.client.email.as_deref(),
            },
        );
        context.insert(
            "car",
            &CarBlock {
                title: doc.car.title(),
                vin: &doc.car.vin,
            },
        );
        context.insert("orders", &orders);
        context.insert("grand_total", &config.money(doc.grand_total));

        self.tera
            .render(format.template(), &context)
            .map_err(|e| ShopError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::PrintedOrder;
    use crate::entities::{Car, Client, Order, OrderStatus, PartLine};
    use chrono::{NaiveDate, NaiveDateTime};

    fn document() -> PrintDocument {
        let order = Order {
            id: 1,
            car_id: 1,
            description: "Oil change <urgent>".to_string(),
            labor_cost: 500.0,
            status: OrderStatus::Delivered,
            created_at: NaiveDateTime::parse_from_str("2024-05-03 10:00:00", TIMESTAMP_FORMAT)
                .unwrap(),
        };
        PrintDocument {
            printed_on: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            client: Client {
                id: 1,
                full_name: "Ivanov".to_string(),
                phone: "+7 900 000-00-00".to_string(),
                email: None,
            },
            car: Car {
                id: 1,
                client_id: 1,
                brand: "Lada".to_string(),
                model: "Vesta".to_string(),
                vin: "X1".to_string(),
            },
            orders: vec![PrintedOrder {
                order,
                lines: vec![PartLine::new(1, "Oil filter", 2, 300.0)],
                parts_total: 600.0,
                total: 1100.0,
            }],
            grand_total: 1100.0,
        }
    }

    #[test]
    fn test_html_document_escapes_and_totals() {
        let renderer = DocumentRenderer::new().unwrap();
        let html = renderer
            .render(&document(), DocumentFormat::Html, &Config::default())
            .unwrap();
        assert!(html.contains("Lada Vesta"));
        assert!(html.contains("Oil change &lt;urgent&gt;"));
        assert!(html.contains("1100.00 ₽"));
        assert!(html.contains("Delivered"));
    }

    #[test]
    fn test_text_document() {
        let renderer = DocumentRenderer::new().unwrap();
        let text = renderer
            .render(&document(), DocumentFormat::Text, &Config::default())
            .unwrap();
        assert!(text.contains("Oil change <urgent>"));
        assert!(text.contains("Oil filter  2 x 300.00 ₽ = 600.00 ₽"));
        assert!(text.contains("Grand total: 1100.00 ₽"));
        assert!(text.contains("Printed 2024-06-02"));
    }

    #[test]
    fn test_empty_history_renders() {
        let mut doc = document();
        doc.orders.clear();
        doc.grand_total = 0.0;
        let renderer = DocumentRenderer::new().unwrap();
        let text = renderer
            .render(&doc, DocumentFormat::Text, &Config::default())
            .unwrap();
        assert!(text.contains("No orders recorded"));
    }
}
