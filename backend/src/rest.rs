use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{
    CreatedResponse, MessageResponse, PetRequest, RecordVaccinationRequest, ScheduleRequest,
};
use tracing::info;

use crate::auth::AuthUser;
use crate::db::DbConnection;
use crate::domain::{NotificationService, RecommendationService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub recommendations: RecommendationService,
    pub notifications: NotificationService,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(db: DbConnection, jwt_secret: String) -> Self {
        Self {
            db,
            recommendations: RecommendationService::new(),
            notifications: NotificationService::new(),
            jwt_secret,
        }
    }
}

fn message(status: StatusCode, text: &str) -> axum::response::Response {
    (status, Json(MessageResponse { message: text.to_string() })).into_response()
}

fn require_admin(user: &AuthUser) -> Result<(), axum::response::Response> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(message(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

// ---- pets ----

/// Axum handler function for GET /api/pets
pub async fn list_pets(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    info!("GET /api/pets - user: {}", user.id);

    match state.db.list_pets(user.id).await {
        Ok(pets) => (StatusCode::OK, Json(pets)).into_response(),
        Err(e) => {
            tracing::error!("Error listing pets: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error listing pets")
        }
    }
}

/// Axum handler function for POST /api/pets
pub async fn create_pet(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<PetRequest>,
) -> impl IntoResponse {
    info!("POST /api/pets - user: {}, name: {}", user.id, request.name);

    if request.name.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Pet name is required");
    }

    match state.db.create_pet(user.id, &request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse { message: "Pet created".to_string(), id }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error creating pet: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error creating pet")
        }
    }
}

/// Axum handler function for GET /api/pets/:id
pub async fn get_pet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/pets/{} - user: {}", pet_id, user.id);

    match state.db.get_pet(pet_id, user.id).await {
        Ok(Some(pet)) => (StatusCode::OK, Json(pet)).into_response(),
        Ok(None) => message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error retrieving pet: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving pet")
        }
    }
}

/// Axum handler function for PUT /api/pets/:id
pub async fn update_pet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
    Json(request): Json<PetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/pets/{} - user: {}", pet_id, user.id);

    if request.name.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Pet name is required");
    }

    match state.db.update_pet(pet_id, user.id, &request).await {
        Ok(true) => message(StatusCode::OK, "Pet updated"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error updating pet: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error updating pet")
        }
    }
}

/// Axum handler function for DELETE /api/pets/:id
pub async fn delete_pet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/pets/{} - user: {}", pet_id, user.id);

    match state.db.delete_pet(pet_id, user.id).await {
        Ok(true) => message(StatusCode::OK, "Pet deleted"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error deleting pet: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error deleting pet")
        }
    }
}

// ---- vaccine schedules ----

/// Axum handler function for GET /api/vaccine-schedules (public)
pub async fn list_schedules(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/vaccine-schedules");

    match state.db.list_schedules().await {
        Ok(schedules) => (StatusCode::OK, Json(schedules)).into_response(),
        Err(e) => {
            tracing::error!("Error listing vaccine schedules: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error listing vaccine schedules")
        }
    }
}

/// Axum handler function for POST /api/vaccine-schedules (admin)
pub async fn create_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ScheduleRequest>,
) -> impl IntoResponse {
    info!("POST /api/vaccine-schedules - user: {}", user.id);

    if let Err(response) = require_admin(&user) {
        return response;
    }
    if request.vaccine_name.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Vaccine name is required");
    }
    if request.age_weeks_min < 0 {
        return message(StatusCode::BAD_REQUEST, "Minimum age cannot be negative");
    }

    match state.db.create_schedule(&request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse { message: "Vaccine schedule created".to_string(), id }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error creating vaccine schedule: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error creating vaccine schedule")
        }
    }
}

/// Axum handler function for PUT /api/vaccine-schedules/:id (admin)
pub async fn update_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(schedule_id): Path<i64>,
    Json(request): Json<ScheduleRequest>,
) -> impl IntoResponse {
    info!("PUT /api/vaccine-schedules/{} - user: {}", schedule_id, user.id);

    if let Err(response) = require_admin(&user) {
        return response;
    }
    if request.age_weeks_min < 0 {
        return message(StatusCode::BAD_REQUEST, "Minimum age cannot be negative");
    }

    match state.db.update_schedule(schedule_id, &request).await {
        Ok(true) => message(StatusCode::OK, "Vaccine schedule updated"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Vaccine schedule not found"),
        Err(e) => {
            tracing::error!("Error updating vaccine schedule: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error updating vaccine schedule")
        }
    }
}

/// Axum handler function for DELETE /api/vaccine-schedules/:id (admin)
pub async fn delete_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(schedule_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/vaccine-schedules/{} - user: {}", schedule_id, user.id);

    if let Err(response) = require_admin(&user) {
        return response;
    }

    match state.db.delete_schedule(schedule_id).await {
        Ok(true) => message(StatusCode::OK, "Vaccine schedule deleted"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Vaccine schedule not found"),
        Err(e) => {
            tracing::error!("Error deleting vaccine schedule: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error deleting vaccine schedule")
        }
    }
}

// ---- recommendations ----

/// Axum handler function for GET /api/pets/:id/recommended-vaccines
pub async fn recommended_vaccines(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/pets/{}/recommended-vaccines - user: {}", pet_id, user.id);

    let pet = match state.db.get_pet(pet_id, user.id).await {
        Ok(Some(pet)) => pet,
        Ok(None) => return message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error retrieving pet: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving pet");
        }
    };

    let snapshot = async {
        let schedules = state.db.list_schedules().await?;
        let history = state.db.list_vaccinations(pet_id).await?;
        anyhow::Ok((schedules, history))
    }
    .await;
    let (schedules, history) = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Error loading vaccine data: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error loading vaccine data");
        }
    };

    let today = chrono::Local::now().date_naive();
    match state.recommendations.recommend(&pet, &schedules, &history, today) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error computing recommendations for pet {}: {}", pet_id, e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error computing recommendations")
        }
    }
}

// ---- vaccinations ----

/// Axum handler function for POST /api/pets/:id/vaccinations
pub async fn record_vaccination(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
    Json(request): Json<RecordVaccinationRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/pets/{}/vaccinations - user: {}, vaccine: {}",
        pet_id, user.id, request.vaccine_name
    );

    if request.vaccine_name.trim().is_empty() || request.vaccination_date.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Vaccine name and vaccination date are required");
    }

    match state.db.get_pet(pet_id, user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => return message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error retrieving pet: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving pet");
        }
    }

    match state.db.record_vaccination(pet_id, &request).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse { message: "Vaccination recorded".to_string(), id }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error recording vaccination: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error recording vaccination")
        }
    }
}

/// Axum handler function for GET /api/pets/:id/vaccination-history
pub async fn vaccination_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pet_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/pets/{}/vaccination-history - user: {}", pet_id, user.id);

    match state.db.get_pet(pet_id, user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => return message(StatusCode::NOT_FOUND, "Pet not found"),
        Err(e) => {
            tracing::error!("Error retrieving pet: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving pet");
        }
    }

    match state.db.list_vaccinations(pet_id).await {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(e) => {
            tracing::error!("Error listing vaccinations: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error listing vaccinations")
        }
    }
}

/// Axum handler function for DELETE /api/vaccinations/:id
pub async fn delete_vaccination(
    State(state): State<AppState>,
    user: AuthUser,
    Path(vaccination_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/vaccinations/{} - user: {}", vaccination_id, user.id);

    match state.db.delete_vaccination(vaccination_id, user.id).await {
        Ok(true) => message(StatusCode::OK, "Vaccination record deleted"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Vaccination record not found"),
        Err(e) => {
            tracing::error!("Error deleting vaccination: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error deleting vaccination")
        }
    }
}

// ---- notifications ----

/// Axum handler function for GET /api/notifications
pub async fn notification_feed(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    info!("GET /api/notifications - user: {}", user.id);

    let rows = match state.db.due_vaccinations(user.id).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Error loading notifications: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error loading notifications");
        }
    };

    let today = chrono::Local::now().date_naive();
    match state.notifications.feed(rows, today) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error building notification feed: {}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error building notification feed")
        }
    }
}

/// Axum handler function for GET /api/notifications/alerts
pub async fn notification_alerts(
    State(state): State<AppState>,
    user: AuthUser,
) -> impl IntoResponse {
    info!("GET /api/notifications/alerts - user: {}", user.id);

    let snapshot = async {
        let pets = state.db.pets_with_history(user.id).await?;
        let schedules = state.db.list_schedules().await?;
        anyhow::Ok((pets, schedules))
    }
    .await;
    let (pets, schedules) = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Error loading alert data: {:?}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error loading alert data");
        }
    };

    let today = chrono::Local::now().date_naive();
    match state.notifications.aggregate(&pets, &schedules, today) {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => {
            tracing::error!("Error computing alerts: {}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error computing alerts")
        }
    }
}

/// Axum handler function for PUT /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(vaccination_id): Path<i64>,
) -> impl IntoResponse {
    info!("PUT /api/notifications/{}/read - user: {}", vaccination_id, user.id);

    match state.db.mark_notification_read(vaccination_id, user.id).await {
        Ok(true) => message(StatusCode::OK, "Notification marked as read"),
        Ok(false) => message(StatusCode::NOT_FOUND, "Notification not found"),
        Err(e) => {
            tracing::error!("Error marking notification read: {:?}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Error marking notification read")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::Response;
    use chrono::{Duration, Local};
    use serde::de::DeserializeOwned;
    use shared::{NotificationFeedResponse, Pet, RecommendationResponse, VaccinationRecord};

    /// Helper to create test handlers
    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AppState::new(db, "test-secret".to_string())
    }

    fn test_user() -> AuthUser {
        AuthUser { id: 1, username: "somsri".to_string(), role: "user".to_string() }
    }

    fn admin_user() -> AuthUser {
        AuthUser { id: 9, username: "admin".to_string(), role: "admin".to_string() }
    }

    fn pet_request(name: &str, birth_date: Option<String>) -> PetRequest {
        PetRequest {
            name: name.to_string(),
            breed: None,
            gender: Some("male".to_string()),
            birth_date,
            color: None,
            weight: None,
            microchip_id: None,
            notes: None,
        }
    }

    async fn body_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&bytes).expect("Failed to deserialize response body")
    }

    async fn create_test_pet(state: &AppState, user: &AuthUser, birth_date: Option<String>) -> i64 {
        let response = create_pet(
            State(state.clone()),
            user.clone(),
            Json(pet_request("Mochi", birth_date)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: CreatedResponse = body_json(response).await;
        created.id
    }

    #[tokio::test]
    async fn test_create_and_get_pet() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), Some("2025-01-01".to_string())).await;

        let response = get_pet(State(state), test_user(), Path(pet_id)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let pet: Pet = body_json(response).await;
        assert_eq!(pet.name, "Mochi");
        assert_eq!(pet.birth_date.as_deref(), Some("2025-01-01"));
    }

    #[tokio::test]
    async fn test_create_pet_requires_name() {
        let state = setup_test_state().await;

        let response = create_pet(State(state), test_user(), Json(pet_request("  ", None)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_pet_of_other_user_is_not_found() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), None).await;

        let other = AuthUser { id: 2, username: "other".to_string(), role: "user".to_string() };
        let response = get_pet(State(state), other, Path(pet_id)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_schedule_mutation_requires_admin() {
        let state = setup_test_state().await;
        let request = ScheduleRequest {
            vaccine_name: "FeLV".to_string(),
            age_weeks_min: 8,
            age_weeks_max: Some(12),
            is_booster: false,
            frequency_years: None,
            description: None,
        };

        let response =
            create_schedule(State(state.clone()), test_user(), Json(request.clone()))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response =
            create_schedule(State(state), admin_user(), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_schedule_rejects_negative_minimum_age() {
        let state = setup_test_state().await;
        let request = ScheduleRequest {
            vaccine_name: "FeLV".to_string(),
            age_weeks_min: -1,
            age_weeks_max: Some(12),
            is_booster: false,
            frequency_years: None,
            description: None,
        };

        let response =
            create_schedule(State(state.clone()), admin_user(), Json(request.clone()))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = update_schedule(State(state), admin_user(), Path(1), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_schedules_returns_seeded_catalog() {
        let state = setup_test_state().await;

        let response = list_schedules(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let schedules: Vec<shared::VaccineSchedule> = body_json(response).await;
        assert_eq!(schedules.len(), 6);
    }

    #[tokio::test]
    async fn test_recommendations_without_birth_date() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), None).await;

        let response = recommended_vaccines(State(state), test_user(), Path(pet_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let recommendations: RecommendationResponse = body_json(response).await;
        assert!(recommendations.vaccines.is_empty());
        assert!(recommendations.message.is_some());
    }

    #[tokio::test]
    async fn test_recommendations_for_kitten() {
        let state = setup_test_state().await;
        // Ten weeks old today
        let birth = (Local::now().date_naive() - Duration::days(70)).format("%Y-%m-%d").to_string();
        let pet_id = create_test_pet(&state, &test_user(), Some(birth)).await;

        let response = recommended_vaccines(State(state), test_user(), Path(pet_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let recommendations: RecommendationResponse = body_json(response).await;
        assert_eq!(recommendations.pet_age_weeks, 10);
        // The seeded kitten series is all pending
        assert!(recommendations.active_count > 0);
        assert_eq!(recommendations.completed_count, 0);
    }

    #[tokio::test]
    async fn test_record_vaccination_and_history() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), Some("2025-01-01".to_string())).await;

        let request = RecordVaccinationRequest {
            vaccine_name: "FVRCP".to_string(),
            vaccine_type: None,
            vaccination_date: "2025-03-01".to_string(),
            next_due_date: Some("2026-03-01".to_string()),
            veterinarian: Some("Dr. Somchai".to_string()),
            clinic_name: None,
            batch_number: None,
            notes: None,
            schedule_id: Some(1),
        };
        let response =
            record_vaccination(State(state.clone()), test_user(), Path(pet_id), Json(request))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = vaccination_history(State(state), test_user(), Path(pet_id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let history: Vec<VaccinationRecord> = body_json(response).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].vaccine_name, "FVRCP");
        assert_eq!(history[0].schedule_id, Some(1));
    }

    #[tokio::test]
    async fn test_record_vaccination_for_other_users_pet_is_not_found() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), None).await;

        let other = AuthUser { id: 2, username: "other".to_string(), role: "user".to_string() };
        let request = RecordVaccinationRequest {
            vaccine_name: "FVRCP".to_string(),
            vaccine_type: None,
            vaccination_date: "2025-03-01".to_string(),
            next_due_date: None,
            veterinarian: None,
            clinic_name: None,
            batch_number: None,
            notes: None,
            schedule_id: None,
        };
        let response = record_vaccination(State(state), other, Path(pet_id), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_feed_and_mark_read() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), Some("2024-01-01".to_string())).await;

        // Due in three days
        let due = (Local::now().date_naive() + Duration::days(3)).format("%Y-%m-%d").to_string();
        let request = RecordVaccinationRequest {
            vaccine_name: "Rabies".to_string(),
            vaccine_type: None,
            vaccination_date: "2025-01-01".to_string(),
            next_due_date: Some(due),
            veterinarian: None,
            clinic_name: None,
            batch_number: None,
            notes: None,
            schedule_id: None,
        };
        let response =
            record_vaccination(State(state.clone()), test_user(), Path(pet_id), Json(request))
                .await
                .into_response();
        let created: CreatedResponse = body_json(response).await;

        let response = notification_feed(State(state.clone()), test_user()).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let feed: NotificationFeedResponse = body_json(response).await;
        assert_eq!(feed.notifications.len(), 1);
        assert_eq!(feed.unread_count, 1);
        assert_eq!(feed.notifications[0].pet_name, "Mochi");

        let response =
            mark_notification_read(State(state.clone()), test_user(), Path(created.id))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = notification_feed(State(state), test_user()).await.into_response();
        let feed: NotificationFeedResponse = body_json(response).await;
        assert_eq!(feed.unread_count, 0);
    }

    #[tokio::test]
    async fn test_notification_alerts_for_overdue_record() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), Some("2024-01-01".to_string())).await;

        // Overdue by ten days
        let due = (Local::now().date_naive() - Duration::days(10)).format("%Y-%m-%d").to_string();
        let request = RecordVaccinationRequest {
            vaccine_name: "Rabies".to_string(),
            vaccine_type: None,
            vaccination_date: "2025-01-01".to_string(),
            next_due_date: Some(due),
            veterinarian: None,
            clinic_name: None,
            batch_number: None,
            notes: None,
            schedule_id: None,
        };
        record_vaccination(State(state.clone()), test_user(), Path(pet_id), Json(request))
            .await
            .into_response();

        let response = notification_alerts(State(state), test_user()).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let alerts: Vec<shared::AlertItem> = body_json(response).await;
        let urgent = alerts
            .iter()
            .find(|a| a.vaccine_name == "Rabies" && a.alert_type == shared::AlertType::Urgent);
        assert!(urgent.is_some(), "overdue record should produce an urgent alert");
    }

    #[tokio::test]
    async fn test_delete_vaccination_scoped_to_owner() {
        let state = setup_test_state().await;
        let pet_id = create_test_pet(&state, &test_user(), None).await;

        let request = RecordVaccinationRequest {
            vaccine_name: "FVRCP".to_string(),
            vaccine_type: None,
            vaccination_date: "2025-03-01".to_string(),
            next_due_date: None,
            veterinarian: None,
            clinic_name: None,
            batch_number: None,
            notes: None,
            schedule_id: None,
        };
        let response =
            record_vaccination(State(state.clone()), test_user(), Path(pet_id), Json(request))
                .await
                .into_response();
        let created: CreatedResponse = body_json(response).await;

        let other = AuthUser { id: 2, username: "other".to_string(), role: "user".to_string() };
        let response = delete_vaccination(State(state.clone()), other, Path(created.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = delete_vaccination(State(state), test_user(), Path(created.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
