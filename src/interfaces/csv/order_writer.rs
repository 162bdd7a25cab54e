use crate::domain::ids::{CustomerId, OrderId, ProductId};
use crate::domain::order::Order;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct OrderRecord<'a> {
    order_id: OrderId,
    customer_id: CustomerId,
    product_id: ProductId,
    quantity: u32,
    address: &'a str,
    phone_number: &'a str,
}

impl<'a> From<&'a Order> for OrderRecord<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_id: order.id,
            customer_id: order.customer_id,
            product_id: order.product_id,
            quantity: order.quantity.value(),
            address: &order.address,
            phone_number: &order.phone_number,
        }
    }
}

/// Writes placed orders as CSV, one row per order line.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders<'a, I>(&mut self, orders: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Order>,
    {
        let mut wrote_any = false;
        for order in orders {
            self.writer.serialize(OrderRecord::from(order))?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record([
                "order_id",
                "customer_id",
                "product_id",
                "quantity",
                "address",
                "phone_number",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
