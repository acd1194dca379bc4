async fn get_economy(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let panel = engine.camp_world().economy_panel();
    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "economy".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!(panel),
    }))
}

async fn get_cart(
    Path((run_id, cart_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let panel = engine.camp_world().cart_panel(&cart_id).ok_or_else(|| {
        HttpApiError::not_found(
            "cart_id does not match a minecart",
            Some(format!("cart_id={cart_id}")),
        )
    })?;

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "cart".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!(panel),
    }))
}

async fn get_miners(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let views = engine.camp_world().miner_views();
    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "miners".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!({ "miners": views, "total": views.len() }),
    }))
}

async fn get_miner(
    Path((run_id, miner_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let view = engine.camp_world().miner_view(&miner_id).ok_or_else(|| {
        HttpApiError::not_found(
            "miner_id does not match a live miner",
            Some(format!("miner_id={miner_id}")),
        )
    })?;

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "miner".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!(view),
    }))
}
