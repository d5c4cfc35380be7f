//! Single binary web server: REST API over in-memory competitions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tkd_tournament_web::{
    area_delays, build_groups, build_schedule, calculate_results, finalize_match,
    generate_matches, record_round_score, start_match, AgeCategory, Competition, CompetitionError,
    CompetitionId, MatchId, Participant, ParticipantId, Position, RawWeightCategory,
    TournamentConfig, WeightCategories,
};

/// Per-competition entry: competition data + last activity time (for auto-cleanup).
struct CompetitionEntry {
    competition: Competition,
    last_activity: Instant,
}

/// In-memory state: many competitions by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<CompetitionId, CompetitionEntry>>>;

/// Inactivity threshold: competitions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddParticipantBody {
    nom: String,
    prenom: String,
    sexe: String,
    age: u32,
    poids: f64,
    ligue: String,
    #[serde(default)]
    categorie: Option<String>,
}

impl AddParticipantBody {
    fn into_participant(self) -> Participant {
        let mut p = Participant::new(self.nom, self.prenom, self.sexe, self.age, self.poids, self.ligue);
        p.category_tag = self.categorie;
        p
    }
}

/// Configuration as posted by the organizer UI. Weight categories may be
/// shorthand strings or full objects; normalized here, never downstream.
#[derive(Deserialize)]
struct ConfigBody {
    age_categories: Vec<AgeCategory>,
    male_weight_categories: Vec<RawWeightCategory>,
    female_weight_categories: Vec<RawWeightCategory>,
    pool_size: Option<usize>,
    num_areas: Option<u32>,
    round_duration_secs: Option<u32>,
    break_duration_secs: Option<u32>,
    break_frequency: Option<u32>,
    start_time: Option<NaiveDateTime>,
}

impl ConfigBody {
    fn into_config(self) -> Result<TournamentConfig, CompetitionError> {
        let defaults = TournamentConfig::default();
        let male = self
            .male_weight_categories
            .iter()
            .map(RawWeightCategory::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let female = self
            .female_weight_categories
            .iter()
            .map(RawWeightCategory::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TournamentConfig {
            age_categories: self.age_categories,
            weight_categories: WeightCategories { male, female },
            pool_size: self.pool_size.unwrap_or(defaults.pool_size),
            num_areas: self.num_areas.unwrap_or(defaults.num_areas),
            round_duration_secs: self.round_duration_secs.unwrap_or(defaults.round_duration_secs),
            break_duration_secs: self.break_duration_secs.unwrap_or(defaults.break_duration_secs),
            break_frequency: self.break_frequency.unwrap_or(defaults.break_frequency),
            start_time: self.start_time.unwrap_or(defaults.start_time),
        })
    }
}

#[derive(Deserialize)]
struct RoundScoreBody {
    round_index: usize,
    score_a: u32,
    score_b: u32,
    /// Explicit tie-break selection for drawn rounds.
    #[serde(default)]
    winner: Option<Position>,
}

#[derive(Deserialize)]
struct FinalizeBody {
    completed_at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct DelayQuery {
    /// Optional virtual "now"; defaults to the local wall clock.
    now: Option<NaiveDateTime>,
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

/// Path segments: competition id and participant id.
#[derive(Deserialize)]
struct CompetitionParticipantPath {
    id: CompetitionId,
    participant_id: ParticipantId,
}

/// Path segments: competition id and match id.
#[derive(Deserialize)]
struct CompetitionMatchPath {
    id: CompetitionId,
    match_id: MatchId,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" }))
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tkd-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new competition (returns it with id; client stores id for subsequent requests).
#[post("/api/competitions")]
async fn api_create_competition(state: AppState, body: Option<Json<ConfigBody>>) -> HttpResponse {
    let config = match body {
        Some(b) => match b.into_inner().into_config() {
            Ok(c) => c,
            Err(e) => return bad_request(e),
        },
        None => TournamentConfig::default(),
    };
    let mut competition = Competition::new(TournamentConfig::default());
    if let Err(e) = competition.set_config(config) {
        return bad_request(e);
    }
    let id = competition.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        CompetitionEntry {
            competition,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(&g.get(&id).unwrap().competition)
}

/// Get a competition by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.competition)
        }
        None => not_found(),
    }
}

/// Add a participant (competition must be in Registration).
#[post("/api/competitions/{id}/participants")]
async fn api_add_participant(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<AddParticipantBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.add_participant(body.into_inner().into_participant()) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Import participants from a CSV body with headers
/// `nom,prenom,sexe,age,poids,ligue[,categorie]`. Duplicate names are
/// skipped and counted, not fatal.
#[post("/api/competitions/{id}/participants/import")]
async fn api_import_participants(
    state: AppState,
    path: Path<CompetitionPath>,
    body: String,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let mut added = 0u32;
    let mut skipped = 0u32;
    for row in reader.deserialize::<AddParticipantBody>() {
        let row = match row {
            Ok(r) => r,
            Err(e) => return bad_request(format!("CSV parse error: {e}")),
        };
        match c.add_participant(row.into_participant()) {
            Ok(()) => added += 1,
            Err(CompetitionError::DuplicateParticipantName) => skipped += 1,
            Err(e) => return bad_request(e),
        }
    }
    log::info!("Imported {} participant(s), skipped {}", added, skipped);
    HttpResponse::Ok().json(serde_json::json!({ "added": added, "skipped": skipped }))
}

/// Remove a participant by id (competition must be in Registration).
#[delete("/api/competitions/{id}/participants/{participant_id}")]
async fn api_remove_participant(state: AppState, path: Path<CompetitionParticipantPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.remove_participant(path.participant_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Replace the configuration (competition must be in Registration).
#[put("/api/competitions/{id}/config")]
async fn api_set_config(state: AppState, path: Path<CompetitionPath>, body: Json<ConfigBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    let config = match body.into_inner().into_config() {
        Ok(cfg) => cfg,
        Err(e) => return bad_request(e),
    };
    match c.set_config(config) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Categorize participants and build pools (Registration -> GroupsBuilt).
#[post("/api/competitions/{id}/groups")]
async fn api_build_groups(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match build_groups(c) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Generate round-robin fixtures for every pool (GroupsBuilt -> MatchesDrawn).
#[post("/api/competitions/{id}/matches/generate")]
async fn api_generate_matches(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match generate_matches(c) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Assign matches to areas and time slots (MatchesDrawn -> Scheduled).
/// Idempotent: a second call on a scheduled competition is a no-op.
#[post("/api/competitions/{id}/schedule")]
async fn api_build_schedule(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match build_schedule(c) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Start a match (pending -> in_progress).
#[post("/api/competitions/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<CompetitionMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match start_match(c, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Record one round's scores for a match.
#[put("/api/competitions/{id}/matches/{match_id}/rounds")]
async fn api_record_round_score(
    state: AppState,
    path: Path<CompetitionMatchPath>,
    body: Json<RoundScoreBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match record_round_score(c, path.match_id, body.round_index, body.score_a, body.score_b, body.winner) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Finalize a match (in_progress -> completed). Rejected while a counted
/// round lacks a decisive winner.
#[post("/api/competitions/{id}/matches/{match_id}/finalize")]
async fn api_finalize_match(
    state: AppState,
    path: Path<CompetitionMatchPath>,
    body: Option<Json<FinalizeBody>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    let completed_at = body
        .and_then(|b| b.completed_at)
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    match finalize_match(c, path.match_id, completed_at) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

/// Current pool standings.
#[get("/api/competitions/{id}/results")]
async fn api_results(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    HttpResponse::Ok().json(calculate_results(&entry.competition))
}

/// Per-area delay estimates against the schedule.
#[get("/api/competitions/{id}/delays")]
async fn api_delays(state: AppState, path: Path<CompetitionPath>, query: Query<DelayQuery>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &entry.competition;
    let now = query.now.unwrap_or_else(|| chrono::Local::now().naive_local());
    HttpResponse::Ok().json(area_delays(&c.matches, &c.schedule, now))
}

/// Restart competition: back to Registration keeping participants and config.
#[post("/api/competitions/{id}/restart")]
async fn api_restart_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.restart() {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => bad_request(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<CompetitionId, CompetitionEntry>::new()));

    // Background task: every 30 minutes, remove competitions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive competition(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_add_participant)
            .service(api_import_participants)
            .service(api_remove_participant)
            .service(api_set_config)
            .service(api_build_groups)
            .service(api_generate_matches)
            .service(api_build_schedule)
            .service(api_start_match)
            .service(api_record_round_score)
            .service(api_finalize_match)
            .service(api_results)
            .service(api_delays)
            .service(api_restart_competition)
            .service(Files::new("/static", "static").show_files_listing())
    })
    .bind(bind)?
    .run()
    .await
}
