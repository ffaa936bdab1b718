// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Catalog, Endpoint, Method, Repository, Service};

/// Built-in demo catalog: customer, product and order repositories with REST
/// and SOAP endpoints.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![customers(), products(), orders()])
}

fn customers() -> Repository {
    Repository::new(
        "customer-api",
        vec![
            Service::new(
                "CustomerManagement",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/customers").with_operations([
                        "customerId",
                        "customerName",
                        "customerEmail",
                        "customerPhone",
                    ]),
                    Endpoint::new(Method::Post, "/api/v1/customers/create").with_operations([
                        "firstName",
                        "lastName",
                        "email",
                        "phoneNumber",
                        "address",
                    ]),
                    Endpoint::new(Method::Put, "/api/v1/customers/{customerId}")
                        .with_operations(["customerId", "firstName", "lastName", "email"]),
                ],
            ),
            Service::new(
                "CustomerManagement 2.0",
                vec![
                    Endpoint::new(Method::Get, "/api/v2/customers").with_operations([
                        "customerId",
                        "fullName",
                        "email",
                        "phoneNumber",
                        "addressLine1",
                        "addressLine2",
                    ]),
                    Endpoint::new(Method::Get, "/api/v2/customers/{customerId}").with_operations([
                        "customerId",
                        "fullName",
                        "email",
                        "phoneNumber",
                        "dateOfBirth",
                        "customerSegment",
                    ]),
                ],
            ),
            Service::new(
                "CustomerPreferences",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/customers/{customerId}/preferences")
                        .with_operations([
                            "customerId",
                            "communicationPreferences",
                            "marketingConsent",
                        ]),
                    Endpoint::new(Method::Put, "/api/v1/customers/{customerId}/preferences")
                        .with_operations([
                            "customerId",
                            "communicationPreferences",
                            "marketingConsent",
                        ]),
                ],
            ),
        ],
    )
}

fn products() -> Repository {
    Repository::new(
        "product-api",
        vec![
            Service::new(
                "ProductCatalog",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/products").with_operations([
                        "productId",
                        "productName",
                        "price",
                        "category",
                        "inStock",
                    ]),
                    Endpoint::new(Method::Get, "/api/v1/products/{productId}").with_operations([
                        "productId",
                        "productName",
                        "description",
                        "price",
                        "category",
                        "specifications",
                    ]),
                    Endpoint::new(Method::Post, "/api/v1/products").with_operations([
                        "productName",
                        "description",
                        "price",
                        "category",
                        "specifications",
                    ]),
                ],
            ),
            Service::new(
                "InventoryManagement",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/inventory").with_operations([
                        "productId",
                        "warehouseId",
                        "quantity",
                        "lastUpdated",
                    ]),
                    Endpoint::new(Method::Put, "/api/v1/inventory/{productId}").with_operations([
                        "productId",
                        "warehouseId",
                        "quantity",
                        "reason",
                    ]),
                ],
            ),
        ],
    )
}

fn orders() -> Repository {
    Repository::new(
        "order-api-with-very-long-name-that-needs-truncation",
        vec![
            Service::new(
                "OrderManagement",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/orders").with_operations([
                        "orderId",
                        "customerId",
                        "orderDate",
                        "totalAmount",
                        "status",
                    ]),
                    Endpoint::new(Method::Get, "/api/v1/orders/{orderId}").with_operations([
                        "orderId",
                        "customerId",
                        "orderDate",
                        "items",
                        "shippingAddress",
                        "billingAddress",
                        "paymentMethod",
                        "subtotal",
                        "tax",
                        "shippingCost",
                        "totalAmount",
                        "status",
                    ]),
                ],
            ),
            Service::new(
                "SOAP Order Service",
                vec![
                    Endpoint::new(Method::Soap, "http://example.com/soap/OrderService")
                        .with_operations([
                            "CreateOrder",
                            "GetOrderStatus",
                            "UpdateOrderDetails",
                            "CancelOrder",
                            "GetOrderHistory",
                        ]),
                    Endpoint::new(Method::Soap, "http://example.com/soap/OrderPaymentService")
                        .with_operations(["ProcessPayment", "RefundPayment", "GetPaymentStatus"]),
                ],
            ),
            Service::new(
                "Shipping",
                vec![
                    Endpoint::new(Method::Get, "/api/v1/shipping/methods").with_operations([
                        "shippingMethodId",
                        "name",
                        "description",
                        "cost",
                        "estimatedDeliveryDays",
                    ]),
                    Endpoint::new(Method::Get, "/api/v1/shipping/track/{trackingNumber}")
                        .with_operations([
                            "trackingNumber",
                            "carrier",
                            "status",
                            "estimatedDeliveryDate",
                            "trackingEvents",
                        ]),
                    Endpoint::new(Method::Post, "/api/v1/shipping/shipments").with_operations([
                        "orderId",
                        "shippingMethodId",
                        "items",
                        "shippingAddress",
                        "packageDimensions",
                        "packageWeight",
                    ]),
                ],
            ),
        ],
    )
}
