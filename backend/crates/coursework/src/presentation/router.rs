//! Coursework Router

use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use auth::PgAuthRepository;
use auth::domain::repository::{AuthSessionRepository, UserRepository};
use auth::middleware::{AuthMiddlewareState, require_auth};
use kernel::clock::SystemClock;

use crate::application::config::CourseworkConfig;
use crate::domain::code_allocator::CodeAllocator;
use crate::domain::repository::{AssignmentRepository, FileStorage, SubmissionRepository};
use crate::infra::file_storage::DiskFileStorage;
use crate::infra::postgres::PgCourseworkRepository;
use crate::presentation::handlers::{self, CourseworkAppState};

/// Coursework router backed by PostgreSQL and the local upload directory
pub fn coursework_router(
    repo: PgCourseworkRepository,
    files: DiskFileStorage,
    guard: AuthMiddlewareState<PgAuthRepository>,
    config: Arc<CourseworkConfig>,
) -> Router {
    let state = CourseworkAppState {
        repo: Arc::new(repo),
        files: Arc::new(files),
        allocator: Arc::new(CodeAllocator::from_os_rng(config.code_max_attempts)),
        clock: Arc::new(SystemClock),
        config,
    };

    coursework_router_generic(state, guard)
}

/// Coursework router for any repository, storage and auth implementation
///
/// Mounts `/assignments` and `/submissions`, all behind [`require_auth`].
pub fn coursework_router_generic<R, F, A>(
    state: CourseworkAppState<R, F>,
    guard: AuthMiddlewareState<A>,
) -> Router
where
    R: AssignmentRepository + SubmissionRepository + Clone + Send + Sync + 'static,
    F: FileStorage + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let body_limit = state.config.body_limit();

    Router::new()
        .route(
            "/assignments",
            post(handlers::create_assignment::<R, F>).get(handlers::list_assignments::<R, F>),
        )
        .route(
            "/assignments/search/{code}",
            get(handlers::search_assignment::<R, F>),
        )
        .route(
            "/assignments/{id}",
            get(handlers::get_assignment::<R, F>)
                .put(handlers::update_assignment::<R, F>)
                .delete(handlers::delete_assignment::<R, F>),
        )
        .route(
            "/submissions/upload",
            post(handlers::upload_submission::<R, F>),
        )
        .route(
            "/submissions/assignment/{id}",
            get(handlers::list_for_assignment::<R, F>),
        )
        .route("/submissions/student", get(handlers::list_for_student::<R, F>))
        .route("/submissions/teacher", get(handlers::list_for_teacher::<R, F>))
        .route("/submissions/stats", get(handlers::submission_stats::<R, F>))
        .route(
            "/submissions/{id}/grade",
            post(handlers::grade_submission::<R, F>),
        )
        .route(
            "/submissions/{id}/status",
            put(handlers::update_status::<R, F>),
        )
        .route(
            "/submissions/download/{id}",
            get(handlers::download_file::<R, F>),
        )
        .route("/submissions/view/{id}", get(handlers::view_file::<R, F>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(guard, require_auth::<A>))
}
