mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use classbook_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

use self::cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let auth_routes = Router::new()
        .route("/api/auth/signin", post(handlers::auth::signin_handler))
        .route("/api/auth/signup", post(handlers::auth::signup_handler))
        .route("/api/auth/signout", post(handlers::auth::signout_handler))
        .route("/api/auth/groups", get(handlers::auth::list_groups_handler))
        .route("/api/users/me", get(handlers::users::me_handler));

    let user_routes = Router::new()
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/role/{role}",
            get(handlers::users::users_by_role_handler),
        )
        .route(
            "/api/users/group/{group_id}",
            get(handlers::users::group_members_handler),
        )
        .route("/api/users/{user_id}", get(handlers::users::get_user_handler));

    let schedule_routes = Router::new()
        .route(
            "/api/schedules",
            get(handlers::schedules::list_schedules_handler)
                .post(handlers::schedules::create_schedule_handler),
        )
        .route(
            "/api/schedules/today",
            get(handlers::schedules::today_schedule_handler),
        )
        .route(
            "/api/schedules/day/{day}",
            get(handlers::schedules::day_schedule_handler),
        )
        .route(
            "/api/schedules/{entry_id}",
            get(handlers::schedules::get_schedule_handler)
                .put(handlers::schedules::update_schedule_handler)
                .delete(handlers::schedules::delete_schedule_handler),
        );

    let diary_routes = Router::new()
        .route(
            "/api/diary/grades",
            get(handlers::grades::list_grades_handler).post(handlers::grades::create_grade_handler),
        )
        .route(
            "/api/diary/grades/{grade_id}",
            get(handlers::grades::get_grade_handler)
                .put(handlers::grades::update_grade_handler)
                .delete(handlers::grades::delete_grade_handler),
        )
        .route(
            "/api/diary/grades/student/{student_id}",
            get(handlers::grades::student_grades_handler),
        )
        .route(
            "/api/diary/grades/student/{student_id}/average",
            get(handlers::grades::grade_average_handler),
        )
        .route(
            "/api/diary/grades/group/{group_id}",
            get(handlers::grades::group_grades_handler),
        )
        .route(
            "/api/diary/attendance",
            get(handlers::attendance::list_attendance_handler)
                .post(handlers::attendance::create_attendance_handler),
        )
        .route(
            "/api/diary/attendance/{record_id}",
            get(handlers::attendance::get_attendance_handler)
                .put(handlers::attendance::update_attendance_handler)
                .delete(handlers::attendance::delete_attendance_handler),
        )
        .route(
            "/api/diary/attendance/student/{student_id}",
            get(handlers::attendance::student_attendance_handler),
        )
        .route(
            "/api/diary/attendance/group/{group_id}",
            get(handlers::attendance::group_attendance_handler),
        )
        .route(
            "/api/diary/homework",
            get(handlers::homework::list_homework_handler)
                .post(handlers::homework::create_homework_handler),
        )
        .route(
            "/api/diary/homework/{homework_id}",
            get(handlers::homework::get_homework_handler)
                .put(handlers::homework::update_homework_handler)
                .delete(handlers::homework::delete_homework_handler),
        )
        .route(
            "/api/diary/homework/group/{group_id}",
            get(handlers::homework::group_homework_handler),
        )
        .route(
            "/api/diary/homework/student/{student_id}",
            get(handlers::homework::student_homework_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(schedule_routes)
        .merge(diary_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::authenticate_bearer,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
