//! Pure conversions from wire records to stored entities.
//!
//! Numeric provider ids become strings, unix-second timestamps become `DateTime<Utc>` with
//! `0` read as "unset", and records missing their identifying key are rejected.

use crate::dto::{
    AuthedShop, OrderRef, ShopInfoResponse, ShopProfile, WireInvoice, WireOrderDetail,
    WireOrderItem, WirePackage,
};
use crate::error::ShopeeError;
use crate::models::AuthorizedShop;
use chrono::{DateTime, Utc};
use sellerhub_common::models::{
    InvoiceData, LinkedShop, Order, OrderDetails, OrderItem, OrderPackage, PackageItem,
    RecipientAddress, ShopDetails,
};

pub fn id_to_string(id: i64) -> String {
    id.to_string()
}

/// `0` is the provider's "no value" for optional ids.
pub fn optional_id(id: i64) -> Option<String> {
    (id != 0).then(|| id.to_string())
}

pub fn unix_to_utc(field: &str, seconds: i64) -> Result<Option<DateTime<Utc>>, ShopeeError> {
    if seconds == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp(seconds, 0)
        .map(Some)
        .ok_or_else(|| ShopeeError::Mapping(format!("{} out of range: {}", field, seconds)))
}

pub fn authorized_shop_from_wire(shop: &AuthedShop) -> Result<AuthorizedShop, ShopeeError> {
    if shop.shop_id <= 0 {
        return Err(ShopeeError::Mapping(format!(
            "authorized shop without a valid shop_id: {}",
            shop.shop_id
        )));
    }

    Ok(AuthorizedShop {
        shop_id: id_to_string(shop.shop_id),
        region: shop.region.clone(),
        auth_time: unix_to_utc("auth_time", shop.auth_time)?,
        expire_time: unix_to_utc("expire_time", shop.expire_time)?,
        sip_affiliated_shops: shop
            .sip_affi_shop_list
            .iter()
            .map(|affiliate| LinkedShop {
                shop_id: id_to_string(affiliate.affi_shop_id),
                region: affiliate.region.clone(),
            })
            .collect(),
        placeholder_created: false,
    })
}

/// Merges `/shop/get_profile` and `/shop/get_shop_info` into one record.
pub fn shop_details_from_wire(
    shop_id: &str,
    profile: ShopProfile,
    info: ShopInfoResponse,
    now: DateTime<Utc>,
) -> Result<ShopDetails, ShopeeError> {
    if shop_id.is_empty() {
        return Err(ShopeeError::Mapping("shop details without shop_id".to_string()));
    }

    // the profile name is the seller-facing one; info only has it as a fallback
    let shop_name = if profile.shop_name.is_empty() {
        info.shop_name
    } else {
        profile.shop_name
    };

    Ok(ShopDetails {
        shop_id: shop_id.to_string(),
        shop_name,
        logo: profile.shop_logo,
        description: profile.description,
        invoice_issuer: profile.invoice_issuer,
        region: info.region,
        status: info.status,
        fulfillment_flag: info.shop_fulfillment_flag,
        is_cb: info.is_cb,
        is_sip: info.is_sip,
        is_upgraded_cbsc: info.is_upgraded_cbsc,
        is_main_shop: info.is_main_shop,
        is_direct_shop: info.is_direct_shop,
        is_one_awb: info.is_one_awb,
        is_mart_shop: info.is_mart_shop,
        is_outlet_shop: info.is_outlet_shop,
        merchant_id: info.merchant_id.and_then(optional_id),
        linked_main_shop_id: info.linked_main_shop_id.and_then(optional_id),
        mart_shop_id: info.mart_shop_id.and_then(optional_id),
        sip_affiliated_shops: info
            .sip_affi_shops
            .into_iter()
            .map(|affiliate| LinkedShop {
                shop_id: id_to_string(affiliate.affi_shop_id),
                region: affiliate.region,
            })
            .collect(),
        linked_direct_shops: info
            .linked_direct_shop_list
            .into_iter()
            .map(|direct| LinkedShop {
                shop_id: id_to_string(direct.direct_shop_id),
                region: direct.direct_shop_region,
            })
            .collect(),
        outlet_shop_ids: info
            .outlet_shop_info_list
            .into_iter()
            .map(|outlet| id_to_string(outlet.outlet_shop_id))
            .collect(),
        auth_time: unix_to_utc("auth_time", info.auth_time)?,
        expire_time: unix_to_utc("expire_time", info.expire_time)?,
        created_at: now,
        updated_at: now,
    })
}

fn item_from_wire(item: WireOrderItem) -> OrderItem {
    OrderItem {
        item_id: id_to_string(item.item_id),
        item_name: item.item_name,
        item_sku: item.item_sku,
        model_id: id_to_string(item.model_id),
        model_name: item.model_name,
        model_sku: item.model_sku,
        quantity: item.model_quantity_purchased,
        original_price: item.model_original_price,
        discounted_price: item.model_discounted_price,
        wholesale: item.wholesale,
        weight: item.weight,
        add_on_deal: item.add_on_deal,
        main_item: item.main_item,
        add_on_deal_id: optional_id(item.add_on_deal_id),
        promotion_type: item.promotion_type,
        promotion_id: optional_id(item.promotion_id),
        order_item_id: id_to_string(item.order_item_id),
        promotion_group_id: optional_id(item.promotion_group_id),
        image_url: item.image_info.image_url,
        product_location_ids: item.product_location_id,
        is_prescription_item: item.is_prescription_item,
        is_b2c_owned_item: item.is_b2c_owned_item,
    }
}

fn package_from_wire(package: WirePackage) -> OrderPackage {
    OrderPackage {
        package_number: package.package_number,
        logistics_status: package.logistics_status,
        logistics_channel_id: id_to_string(package.logistics_channel_id),
        shipping_carrier: package.shipping_carrier,
        allow_self_design_awb: package.allow_self_design_awb,
        items: package
            .item_list
            .into_iter()
            .map(|item| PackageItem {
                item_id: id_to_string(item.item_id),
                model_id: id_to_string(item.model_id),
                quantity: item.model_quantity,
                order_item_id: id_to_string(item.order_item_id),
                promotion_group_id: optional_id(item.promotion_group_id),
                product_location_id: item.product_location_id,
            })
            .collect(),
        group_shipment_id: optional_id(package.group_shipment_id),
        parcel_chargeable_weight_gram: package.parcel_chargeable_weight_gram,
        package_query_number: package.package_query_number,
        sorting_group: package.sorting_group,
    }
}

fn invoice_from_wire(invoice: WireInvoice) -> Result<Option<InvoiceData>, ShopeeError> {
    if invoice.number.is_empty() && invoice.access_key.is_empty() && invoice.total_value == 0.0 {
        return Ok(None);
    }
    Ok(Some(InvoiceData {
        issue_date: unix_to_utc("invoice_data.issue_date", invoice.issue_date)?,
        number: invoice.number,
        series_number: invoice.series_number,
        access_key: invoice.access_key,
        total_value: invoice.total_value,
        products_total_value: invoice.products_total_value,
        tax_code: invoice.tax_code,
    }))
}

/// Builds an [`Order`] from its detail record, preferring list-entry values for
/// `booking_sn`/`order_status` only when the detail leaves them empty.
pub fn order_from_wire(
    shop_id: &str,
    summary: Option<&OrderRef>,
    detail: WireOrderDetail,
    synced_at: DateTime<Utc>,
) -> Result<Order, ShopeeError> {
    if detail.order_sn.is_empty() {
        return Err(ShopeeError::Mapping("order detail without order_sn".to_string()));
    }
    if let Some(summary) = summary {
        if summary.order_sn != detail.order_sn {
            return Err(ShopeeError::Mapping(format!(
                "order detail {} does not match list entry {}",
                detail.order_sn, summary.order_sn
            )));
        }
    }

    let booking_sn = match (detail.booking_sn.is_empty(), summary) {
        (true, Some(summary)) => summary.booking_sn.clone(),
        _ => detail.booking_sn.clone(),
    };
    let order_status = match (detail.order_status.is_empty(), summary) {
        (true, Some(summary)) => summary.order_status.clone(),
        _ => detail.order_status.clone(),
    };

    let details = OrderDetails {
        note_update_time: unix_to_utc("note_update_time", detail.note_update_time)?,
        ship_by_date: unix_to_utc("ship_by_date", detail.ship_by_date)?,
        pay_time: unix_to_utc("pay_time", detail.pay_time)?,
        pickup_done_time: unix_to_utc("pickup_done_time", detail.pickup_done_time)?,
        edt_from: unix_to_utc("edt_from", detail.edt_from)?,
        edt_to: unix_to_utc("edt_to", detail.edt_to)?,
        return_request_due_date: unix_to_utc(
            "return_request_due_date",
            detail.return_request_due_date,
        )?,
        invoice: match detail.invoice_data {
            Some(invoice) => invoice_from_wire(invoice)?,
            None => None,
        },
        region: detail.region,
        currency: detail.currency,
        cod: detail.cod,
        total_amount: detail.total_amount,
        estimated_shipping_fee: detail.estimated_shipping_fee,
        actual_shipping_fee: detail.actual_shipping_fee,
        actual_shipping_fee_confirmed: detail.actual_shipping_fee_confirmed,
        reverse_shipping_fee: detail.reverse_shipping_fee,
        payment_method: detail.payment_method,
        shipping_carrier: detail.shipping_carrier,
        checkout_shipping_carrier: detail.checkout_shipping_carrier,
        message_to_seller: detail.message_to_seller,
        note: detail.note,
        buyer_user_id: optional_id(detail.buyer_user_id).unwrap_or_default(),
        buyer_username: detail.buyer_username,
        buyer_cpf_id: detail.buyer_cpf_id,
        days_to_ship: detail.days_to_ship,
        recipient_address: RecipientAddress {
            name: detail.recipient_address.name,
            phone: detail.recipient_address.phone,
            town: detail.recipient_address.town,
            district: detail.recipient_address.district,
            city: detail.recipient_address.city,
            state: detail.recipient_address.state,
            region: detail.recipient_address.region,
            zipcode: detail.recipient_address.zipcode,
            full_address: detail.recipient_address.full_address,
            virtual_contact_number: detail.recipient_address.virtual_contact_number,
        },
        items: detail.item_list.into_iter().map(item_from_wire).collect(),
        packages: detail.package_list.into_iter().map(package_from_wire).collect(),
        pending_terms: detail.pending_terms,
        cancel_by: detail.cancel_by,
        cancel_reason: detail.cancel_reason,
        buyer_cancel_reason: detail.buyer_cancel_reason,
        dropshipper: detail.dropshipper,
        dropshipper_phone: detail.dropshipper_phone,
        split_up: detail.split_up,
        goods_to_declare: detail.goods_to_declare,
        fulfillment_flag: detail.fulfillment_flag,
        order_chargeable_weight_gram: detail.order_chargeable_weight_gram,
        prescription_images: detail.prescription_images,
        prescription_check_status: detail.prescription_check_status,
        advance_package: detail.advance_package,
    };

    Ok(Order {
        shop_id: shop_id.to_string(),
        create_time: unix_to_utc("create_time", detail.create_time)?,
        update_time: unix_to_utc("update_time", detail.update_time)?,
        order_sn: detail.order_sn,
        booking_sn,
        order_status,
        details,
        synced_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{OrderDetailResponse, ShopInfoResponse};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn order_detail_maps_ids_and_timestamps() {
        let raw = serde_json::json!({
            "response": { "order_list": [{
                "order_sn": "2403101ABC",
                "order_status": "READY_TO_SHIP",
                "create_time": 1_700_000_100,
                "update_time": 0,
                "buyer_user_id": 9876543210_i64,
                "total_amount": 120.5,
                "item_list": [{ "item_id": 111, "model_id": 0, "model_quantity_purchased": 2,
                                "image_info": { "image_url": "https://img/1" } }],
                "package_list": [{ "package_number": "P1", "logistics_channel_id": 30001,
                                   "item_list": null }],
                "invoice_data": null,
                "prescription_images": null
            }]}
        });
        let response: OrderDetailResponse = serde_json::from_value(raw).unwrap();
        let detail = response.response.order_list.into_iter().next().unwrap();
        let summary = OrderRef {
            order_sn: "2403101ABC".into(),
            booking_sn: "BK1".into(),
            order_status: "UNPAID".into(),
        };

        let order = order_from_wire("5501", Some(&summary), detail, now()).unwrap();

        assert_eq!(order.shop_id, "5501");
        assert_eq!(order.booking_sn, "BK1");
        assert_eq!(order.order_status, "READY_TO_SHIP");
        assert_eq!(order.create_time.unwrap().timestamp(), 1_700_000_100);
        assert!(order.update_time.is_none());
        assert_eq!(order.details.buyer_user_id, "9876543210");
        assert_eq!(order.details.items[0].item_id, "111");
        assert_eq!(order.details.items[0].quantity, 2);
        assert_eq!(order.details.items[0].image_url, "https://img/1");
        assert_eq!(order.details.packages[0].logistics_channel_id, "30001");
        assert!(order.details.packages[0].items.is_empty());
        assert!(order.details.invoice.is_none());
        assert_eq!(order.synced_at, now());
    }

    #[test]
    fn order_without_sn_is_rejected() {
        let err = order_from_wire("5501", None, WireOrderDetail::default(), now()).unwrap_err();
        assert!(matches!(err, ShopeeError::Mapping(_)));
    }

    #[test]
    fn mismatched_summary_is_rejected() {
        let detail = WireOrderDetail {
            order_sn: "A".into(),
            ..Default::default()
        };
        let summary = OrderRef {
            order_sn: "B".into(),
            ..Default::default()
        };
        assert!(order_from_wire("1", Some(&summary), detail, now()).is_err());
    }

    #[test]
    fn out_of_range_timestamp_fails_mapping() {
        let detail = WireOrderDetail {
            order_sn: "A".into(),
            pay_time: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            order_from_wire("1", None, detail, now()),
            Err(ShopeeError::Mapping(_))
        ));
    }

    #[test]
    fn shop_details_merge_profile_and_info() {
        let profile = ShopProfile {
            shop_logo: "https://logo".into(),
            description: "desc".into(),
            shop_name: "".into(),
            invoice_issuer: "Other".into(),
        };
        let info: ShopInfoResponse = serde_json::from_value(serde_json::json!({
            "shop_name": "Tiny Shop",
            "region": "TH",
            "status": "NORMAL",
            "merchant_id": null,
            "linked_main_shop_id": 0,
            "mart_shop_id": 77,
            "sip_affi_shops": [{ "affi_shop_id": 12, "region": "MY" }],
            "outlet_shop_info_list": [{ "outlet_shop_id": 5 }],
            "auth_time": 1_700_000_000,
            "expire_time": 0
        }))
        .unwrap();

        let details = shop_details_from_wire("5501", profile, info, now()).unwrap();

        assert_eq!(details.shop_name, "Tiny Shop");
        assert_eq!(details.logo, "https://logo");
        assert_eq!(details.region, "TH");
        assert_eq!(details.merchant_id, None);
        assert_eq!(details.linked_main_shop_id, None);
        assert_eq!(details.mart_shop_id.as_deref(), Some("77"));
        assert_eq!(details.sip_affiliated_shops[0].shop_id, "12");
        assert_eq!(details.outlet_shop_ids, vec!["5".to_string()]);
        assert_eq!(details.auth_time, Some(now()));
        assert_eq!(details.expire_time, None);
    }

    #[test]
    fn authorized_shop_requires_id() {
        assert!(authorized_shop_from_wire(&AuthedShop::default()).is_err());
        let shop = AuthedShop {
            shop_id: 5501,
            region: "SG".into(),
            ..Default::default()
        };
        let mapped = authorized_shop_from_wire(&shop).unwrap();
        assert_eq!(mapped.shop_id, "5501");
        assert!(!mapped.placeholder_created);
    }
}
