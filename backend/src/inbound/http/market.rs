//! The market page: listing, purchase and sale.
//!
//! Both actions post to `/market` and always answer with a redirect back to
//! it, so a refresh never repeats a transfer.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{PurchaseOutcome, SaleOutcome};
use crate::domain::{ErrorCode, Item, ItemId};

use super::ApiResult;
use super::accounts::LOGIN_REQUIRED;
use super::flash::Flash;
use super::pages::{Page, see_other};
use super::session::SessionContext;
use super::state::HttpState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarketForm {
    pub purchase_item: Option<String>,
    pub sold_item: Option<String>,
}

#[derive(Debug, Serialize)]
struct ItemView {
    id: String,
    name: String,
    barcode: String,
    price: String,
    description: String,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.to_string(),
            barcode: item.barcode.to_string(),
            price: item.price.pretty(),
            description: item.description.to_string(),
        }
    }
}

fn to_login(session: &SessionContext) -> ApiResult<HttpResponse> {
    session.push_flash(Flash::info(LOGIN_REQUIRED))?;
    Ok(see_other("/login"))
}

#[get("/market")]
pub async fn market_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(user_id) = session.user_id()? else {
        return to_login(&session);
    };

    let overview = match state.market_query.overview(&user_id).await {
        Ok(overview) => overview,
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            session.reset();
            return to_login(&session);
        }
        Err(error) => return Err(error),
    };

    let for_sale: Vec<ItemView> = overview.for_sale.iter().map(ItemView::from).collect();
    let owned: Vec<ItemView> = overview.owned.iter().map(ItemView::from).collect();
    Page::new("market.html")
        .with("for_sale", &for_sale)
        .with("owned", &owned)
        .user(&overview.user)
        .render(&state, &session)
        .await
}

fn purchase_flash(outcome: PurchaseOutcome) -> Flash {
    match outcome {
        PurchaseOutcome::Purchased { name, price, .. } => Flash::success(format!(
            "Congratulations! You purchased {name} for {}$",
            price.amount()
        )),
        PurchaseOutcome::InsufficientBudget { name, .. } => Flash::danger(format!(
            "Unfortunately, you don't have enough money to purchase {name}!"
        )),
        PurchaseOutcome::Unavailable { name: Some(name) } => {
            Flash::danger(format!("{name} is no longer available"))
        }
        PurchaseOutcome::Unavailable { name: None } => {
            Flash::danger("This item is no longer available")
        }
    }
}

fn sale_flash(outcome: SaleOutcome) -> Flash {
    match outcome {
        SaleOutcome::Sold { name, .. } => {
            Flash::success(format!("Congratulations! You sold {name} back to market!"))
        }
        SaleOutcome::Rejected { name: Some(name) } => {
            Flash::danger(format!("Something went wrong with selling {name}"))
        }
        SaleOutcome::Rejected { name: None } => {
            Flash::danger("Something went wrong with selling this item")
        }
    }
}

#[post("/market")]
pub async fn market_action(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<MarketForm>,
) -> ApiResult<HttpResponse> {
    let Some(user_id) = session.user_id()? else {
        return to_login(&session);
    };
    let MarketForm {
        purchase_item,
        sold_item,
    } = form.into_inner();

    let flash = if let Some(raw) = purchase_item {
        match ItemId::new(&raw) {
            Ok(item) => purchase_flash(state.market_command.purchase(&user_id, &item).await?),
            Err(_) => purchase_flash(PurchaseOutcome::Unavailable { name: None }),
        }
    } else if let Some(raw) = sold_item {
        match ItemId::new(&raw) {
            Ok(item) => sale_flash(state.market_command.sell(&user_id, &item).await?),
            Err(_) => sale_flash(SaleOutcome::Rejected { name: None }),
        }
    } else {
        return Ok(see_other("/market"));
    };

    session.push_flash(flash)?;
    Ok(see_other("/market"))
}

#[cfg(test)]
#[path = "market_tests.rs"]
mod tests;
