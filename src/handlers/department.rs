//! Department handlers
//!
//! Department tree, member overlay, create and edit form

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::dashboard::department::{DepartmentPage, DeptForm};
use crate::dashboard::DepartmentDashboard;
use crate::entity::{department, user};
use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/organization/t_dept
pub async fn get_department_tree(State(state): State<AppState>) -> Json<ApiResponse<DepartmentPage>> {
    let result: AppResult<DepartmentPage> = async {
        let mut dashboard = DepartmentDashboard::new(state.client());
        dashboard.reload().await?;
        Ok(dashboard.view())
    }
    .await;
    Json(ApiResponse::from_result(result))
}

/// GET /api/organization/t_dept/:id/members
pub async fn get_department_members(
    State(state): State<AppState>,
    Path(dept_id): Path<i64>,
) -> Json<ApiResponse<Vec<user::Model>>> {
    let dashboard = DepartmentDashboard::new(state.client());
    Json(ApiResponse::from_result(dashboard.members(dept_id).await))
}

/// POST /api/organization/t_dept
pub async fn add_department(
    State(state): State<AppState>,
    Json(form): Json<DeptForm>,
) -> Json<ApiResponse<department::Model>> {
    let mut dashboard = DepartmentDashboard::new(state.client());
    Json(ApiResponse::from_result(dashboard.create(form).await))
}

/// PATCH /api/organization/t_dept/:id
pub async fn update_department(
    State(state): State<AppState>,
    Path(dept_id): Path<i64>,
    Json(form): Json<DeptForm>,
) -> Json<ApiResponse<DepartmentPage>> {
    let result: AppResult<DepartmentPage> = async {
        let mut dashboard = DepartmentDashboard::new(state.client());
        dashboard.reload().await?;
        dashboard.select(dept_id)?;
        dashboard.save_selected(form).await?;
        Ok(dashboard.view())
    }
    .await;
    Json(ApiResponse::from_result(result))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use crate::association::{replace_associations, AssociationKind};
    use crate::config::Config;
    use crate::resource::ResourceClient;
    use crate::routes::create_router;
    use crate::state::AppState;
    use crate::testing::{call, memory_db, seed_dept, seed_user};

    #[tokio::test]
    async fn test_tree_create_and_members() {
        let db = memory_db().await;
        seed_dept(&db, 1, "总部", 0).await;
        seed_user(&db, "u-1", "alice", "alice@example.com").await;
        replace_associations(&ResourceClient::new(db.clone()), "u-1", AssociationKind::Dept, [1])
            .await
            .unwrap();
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/organization/t_dept",
            Some(json!({"dept_name": "研发部", "dept_parent_id": 1})),
        )
        .await;
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["dept_status"], "0");

        let (_, body) = call(&app, Method::POST, "/api/organization/t_dept", Some(json!({"dept_name": ""}))).await;
        assert_eq!(body["code"], false);
        assert_eq!(body["message"], "请输入部门名称");

        let (_, body) = call(&app, Method::GET, "/api/organization/t_dept", None).await;
        let root = &body["data"]["tree"][0];
        assert_eq!(root["dept_name"], "总部");
        assert_eq!(root["member_count"], 1);
        assert_eq!(root["children"][0]["dept_name"], "研发部");
        assert_eq!(body["data"]["parent_options"][0]["label"], "无");

        let (_, body) = call(&app, Method::GET, "/api/organization/t_dept/1/members", None).await;
        assert_eq!(body["data"][0]["user_id"], "u-1");
    }

    #[tokio::test]
    async fn test_update_department_form() {
        let db = memory_db().await;
        seed_dept(&db, 1, "总部", 0).await;
        seed_dept(&db, 2, "研发部", 0).await;
        let app = create_router(AppState::new(db, Config::default()));

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/organization/t_dept/2",
            Some(json!({"dept_name": "研发中心", "dept_parent_id": 1, "dept_status": "0"})),
        )
        .await;
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["tree"][0]["children"][0]["dept_name"], "研发中心");
        assert_eq!(body["data"]["notices"][0]["message"], "保存成功");

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/organization/t_dept/2",
            Some(json!({"dept_name": "研发中心", "dept_parent_id": 2})),
        )
        .await;
        assert_eq!(body["code"], false);

        let (_, body) = call(
            &app,
            Method::PATCH,
            "/api/organization/t_dept/2",
            Some(json!({"dept_name": "研发中心", "dept_parent_id": -5})),
        )
        .await;
        assert_eq!(body["code"], true);
        assert_eq!(body["data"]["tree"][1]["dept_name"], "研发中心");
        let (_, body) = call(&app, Method::GET, "/api/resources/t_dept/2", None).await;
        assert_eq!(body["data"]["dept_parent_id"], 0);
    }
}
