use crate::balance::compute_balances;
use crate::error::{DataIntegrityWarning, ValidationError};
use crate::exchange::{suggest_settlements, SettlementSuggestion};
use crate::money::Money;
use crate::repository::GroupRepository;
use crate::schemas::{
    ExpenseDraft, Group, Member, MemberId, SplitType, Splits, DEFAULT_CATEGORIES,
};
use crate::split::{
    compute_splits, input_total, prepare_expense, validate_total, SplitInput, PERCENTAGE_TOTAL,
};
use crate::summary::summarize;
use crate::Result;
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

type Repository = web::Data<dyn GroupRepository>;

#[derive(Deserialize, Serialize)]
pub struct MemberJson {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl MemberJson {
    fn into_member(self) -> Result<Member> {
        let id = match self.id {
            Some(id) => MemberId::new(id)?,
            None => MemberId::generate(),
        };
        Ok(Member {
            id,
            name: self.name,
            email: self.email.filter(|e| !e.trim().is_empty()),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
        })
    }
}

#[derive(Deserialize, Serialize)]
pub struct GroupJson {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub creator: MemberJson,
    #[serde(default)]
    pub members: Vec<MemberJson>,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPreviewJson {
    pub amount: Decimal,
    pub split_type: String,
    #[serde(default)]
    pub custom_splits: SplitInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SplitPreview {
    input_total: Decimal,
    total_matches: bool,
    splits: Option<Splits>,
    error: Option<String>,
}

#[derive(Serialize)]
struct Settlements {
    suggestions: Vec<SettlementSuggestion>,
    warnings: Vec<DataIntegrityWarning>,
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/categories")]
async fn get_categories() -> HttpResponse {
    HttpResponse::Ok().json(DEFAULT_CATEGORIES)
}

#[put("/groups/{id}")]
async fn add_group(
    repo: Repository,
    id: web::Path<String>,
    json: web::Json<GroupJson>,
) -> Result<HttpResponse> {
    let json = json.into_inner();
    let creator = json.creator.into_member()?;
    let members = json
        .members
        .into_iter()
        .map(MemberJson::into_member)
        .collect::<Result<Vec<_>>>()?;
    let group = Group::new(id.into_inner(), json.name, json.description, creator, members)?;
    repo.create_group(&group).await?;
    tracing::info!(group_id = %group.id, members = group.members.len(), "Group added");
    Ok(HttpResponse::Created().json(group))
}

#[get("/groups/{id}")]
async fn get_group(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(repo.load_group(&id).await?))
}

#[delete("/groups/{id}")]
async fn delete_group(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    repo.delete_group(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/groups/{id}/members")]
async fn add_member(
    repo: Repository,
    id: web::Path<String>,
    json: web::Json<MemberJson>,
) -> Result<HttpResponse> {
    let mut group = repo.load_group(&id).await?;
    let member = json.into_inner().into_member()?;
    group.add_member(member.clone())?;
    repo.update_group(&group).await?;
    Ok(HttpResponse::Created().json(member))
}

#[delete("/groups/{id}/members/{member_id}")]
async fn remove_member(
    repo: Repository,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (group_id, member_id) = path.into_inner();
    let member_id = MemberId::new(member_id)?;
    let mut group = repo.load_group(&group_id).await?;
    let expenses = repo.load_group_expenses(&group_id).await?;
    group.remove_member(&member_id, &expenses)?;
    repo.update_group(&group).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/groups/{id}/expenses")]
async fn get_expenses(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    repo.load_group(&id).await?;
    Ok(HttpResponse::Ok().json(repo.load_group_expenses(&id).await?))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    repo: Repository,
    id: web::Path<String>,
    json: web::Json<ExpenseDraft>,
) -> Result<HttpResponse> {
    let group = repo.load_group(&id).await?;
    let expense = prepare_expense(&group, json.into_inner(), Utc::now())?;
    repo.save_group_expense(&expense).await?;
    tracing::info!(
        group_id = %group.id,
        expense_id = %expense.id,
        amount = %expense.amount,
        split_type = %expense.split_type,
        "Expense added"
    );
    Ok(HttpResponse::Created().json(expense))
}

#[delete("/groups/{id}/expenses/{expense_id}")]
async fn delete_expense(
    repo: Repository,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (group_id, expense_id) = path.into_inner();
    repo.delete_group_expense(&group_id, &expense_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/groups/{id}/splits/preview")]
async fn preview_splits(
    repo: Repository,
    id: web::Path<String>,
    json: web::Json<SplitPreviewJson>,
) -> Result<HttpResponse> {
    let group = repo.load_group(&id).await?;
    let json = json.into_inner();
    let split_type: SplitType = json.split_type.parse()?;

    let total = input_total(json.custom_splits.values())
        .ok_or(ValidationError::AmountOutOfRange(Decimal::MAX))?;
    let total_matches = match split_type {
        SplitType::Exact => validate_total(json.custom_splits.values(), json.amount),
        SplitType::Percentage => validate_total(json.custom_splits.values(), PERCENTAGE_TOTAL),
        SplitType::Equal | SplitType::Shares => true,
    };

    let computed = Money::from_decimal(json.amount)
        .ok_or(ValidationError::AmountOutOfRange(json.amount))
        .and_then(|amount| compute_splits(amount, split_type, &group, &json.custom_splits));
    let (splits, error) = match computed {
        Ok(splits) => (Some(splits), None),
        Err(err) => (None, Some(err.to_string())),
    };

    Ok(HttpResponse::Ok().json(SplitPreview {
        input_total: total,
        total_matches,
        splits,
        error,
    }))
}

#[get("/groups/{id}/balance")]
async fn get_balance(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    let group = repo.load_group(&id).await?;
    let expenses = repo.load_group_expenses(&id).await?;
    Ok(HttpResponse::Ok().json(compute_balances(&group, &expenses)?))
}

#[get("/groups/{id}/settlements")]
async fn get_settlements(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    let group = repo.load_group(&id).await?;
    let expenses = repo.load_group_expenses(&id).await?;
    let balances = compute_balances(&group, &expenses)?;
    let plan = suggest_settlements(&balances);

    let mut warnings: Vec<DataIntegrityWarning> =
        balances.integrity_warning().into_iter().collect();
    warnings.extend(plan.warnings());
    Ok(HttpResponse::Ok().json(Settlements {
        suggestions: plan.suggestions,
        warnings,
    }))
}

#[get("/groups/{id}/summary")]
async fn get_summary(repo: Repository, id: web::Path<String>) -> Result<HttpResponse> {
    let group = repo.load_group(&id).await?;
    let expenses = repo.load_group_expenses(&id).await?;
    Ok(HttpResponse::Ok().json(summarize(&group, &expenses)?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(get_categories)
        .service(add_group)
        .service(get_group)
        .service(delete_group)
        .service(add_member)
        .service(remove_member)
        .service(get_expenses)
        .service(add_expense)
        .service(delete_expense)
        .service(preview_splits)
        .service(get_balance)
        .service(get_settlements)
        .service(get_summary);
}
