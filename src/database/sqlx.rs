use crate::core::models::{
    common::Pagination,
    feedback::{Feedback, Insert as FeedbackInsert},
    idea::{Idea, Insert as IdeaInsert, VoteTally},
    judge::{JudgeVote, Rank},
    phase::{Phase, PhaseName},
    project::{Insert as ProjectInsert, Order as ProjectOrder, Project, Query as ProjectQuery, WinnerCategory},
    team::{Insert as TeamInsert, Team, TeamMember},
    user::User,
};
use crate::core::ports::repository::{
    Common, FeedbackCommon, IdeaCommon, IdeaVoteCommon, JudgeVoteCommon, Manager, PhaseCommon, ProjectCommon, ShowcaseVoteCommon, Store, TeamCommon, TxStore, UserCommon,
};
use crate::database::models::{feedback::FeedbackRow, judge_vote::JudgeVoteRow, phase::PhaseRow};
use crate::error::Error;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

const IDEA_COLUMNS: &str = "
    i.id, i.title, i.description, i.user_id, i.is_locked, i.created_at,
    (SELECT COUNT(*) FROM idea_votes AS iv WHERE iv.idea_id = i.id) AS vote_count";

const TEAM_COLUMNS: &str = "
    t.id, t.name, t.description, t.leader_id, t.idea_id, t.max_members, t.created_at,
    (SELECT COUNT(*) FROM team_members AS tm WHERE tm.team_id = t.id) AS member_count";

const PROJECT_COLUMNS: &str = "
    p.id, p.team_id, p.title, p.description, p.repo_url, p.demo_url, p.video_url, p.presentation_url, p.track,
    p.judges_score, p.is_winner, p.winner_category, p.submitted_at,
    (SELECT COUNT(*) FROM showcase_votes AS sv WHERE sv.project_id = p.id) AS showcase_vote_count,
    (SELECT COALESCE(SUM(4 - jv.rank), 0) FROM judge_votes AS jv WHERE jv.project_id = p.id) AS judge_vote_count";

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get(&mut self, id: i32) -> Result<User, Error> {
        let user = query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(user)
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE name = $1").bind(name).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn insert(&mut self, name: &str) -> Result<User, Error> {
        let user = query_as("INSERT INTO users (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&mut self.executor)
            .await
            .map_err(|e| Error::from_insert(e, "This name is already taken. Please choose another."))?;
        Ok(user)
    }

    async fn touch(&mut self, id: i32, at: DateTime<Utc>) -> Result<(), Error> {
        query("UPDATE users SET last_seen_at = $1 WHERE id = $2").bind(at).bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl<E> IdeaCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: IdeaInsert) -> Result<Idea, Error> {
        let id: i32 = query_scalar("INSERT INTO ideas (title, description, user_id) VALUES ($1, $2, $3) RETURNING id")
            .bind(data.title)
            .bind(data.description)
            .bind(data.user_id)
            .fetch_one(&mut self.executor)
            .await?;
        IdeaCommon::get(self, id).await
    }

    async fn get(&mut self, id: i32) -> Result<Idea, Error> {
        let idea = query_as(&format!("SELECT {} FROM ideas AS i WHERE i.id = $1", IDEA_COLUMNS))
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        idea.ok_or_else(|| Error::NotFound(format!("idea {}", id)))
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Idea, Error> {
        let idea = query_as(&format!("SELECT {} FROM ideas AS i WHERE i.id = $1 FOR UPDATE", IDEA_COLUMNS))
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        idea.ok_or_else(|| Error::NotFound(format!("idea {}", id)))
    }

    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Idea>, Error> {
        let mut stmt = QueryBuilder::new(format!("SELECT {} FROM ideas AS i ORDER BY vote_count DESC, i.created_at ASC", IDEA_COLUMNS));
        if let Some(p) = pagination {
            stmt.push(" LIMIT ").push_bind(p.limit);
            stmt.push(" OFFSET ").push_bind(p.offset);
        }
        let ideas = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(ideas)
    }

    async fn count(&mut self) -> Result<i64, Error> {
        let n = query_scalar("SELECT COUNT(*) FROM ideas").fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn lock(&mut self, id: i32) -> Result<u64, Error> {
        let res = query("UPDATE ideas SET is_locked = TRUE WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(res.rows_affected())
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let res = query("DELETE FROM ideas WHERE id = $1").bind(id).execute(&mut self.executor).await.map_err(|e| match e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => Error::Duplicate("a team has been formed around this idea".into()),
            e => Error::DatabaseError(e),
        })?;
        Ok(res.rows_affected())
    }
}

impl<E> IdeaVoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn count(&mut self, idea_id: i32, user_id: i32) -> Result<i64, Error> {
        let n = query_scalar("SELECT COUNT(*) FROM idea_votes WHERE idea_id = $1 AND user_id = $2")
            .bind(idea_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(n)
    }

    async fn insert_many(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<(), Error> {
        query("INSERT INTO idea_votes (idea_id, user_id) SELECT $1, $2 FROM generate_series(1, $3)")
            .bind(idea_id)
            .bind(user_id)
            .bind(n)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn delete_latest(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<u64, Error> {
        let res = query(
            "DELETE FROM idea_votes WHERE id IN (
                SELECT id
                FROM idea_votes
                WHERE idea_id = $1 AND user_id = $2
                ORDER BY created_at DESC, id DESC
                LIMIT $3)",
        )
        .bind(idea_id)
        .bind(user_id)
        .bind(n)
        .execute(&mut self.executor)
        .await?;
        Ok(res.rows_affected())
    }

    async fn tallies(&mut self, user_id: i32) -> Result<Vec<VoteTally>, Error> {
        let tallies = query_as("SELECT idea_id, COUNT(*) AS count FROM idea_votes WHERE user_id = $1 GROUP BY idea_id")
            .bind(user_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(tallies)
    }
}

impl<E> TeamCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: TeamInsert) -> Result<Team, Error> {
        let id: i32 = query_scalar("INSERT INTO teams (name, description, leader_id, idea_id, max_members) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(data.name)
            .bind(data.description)
            .bind(data.leader_id)
            .bind(data.idea_id)
            .bind(data.max_members)
            .fetch_one(&mut self.executor)
            .await
            .map_err(|e| Error::from_insert(e, "A team already exists for this idea"))?;
        TeamCommon::get(self, id).await
    }

    async fn get(&mut self, id: i32) -> Result<Team, Error> {
        let team = query_as(&format!("SELECT {} FROM teams AS t WHERE t.id = $1", TEAM_COLUMNS))
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        team.ok_or_else(|| Error::NotFound(format!("team {}", id)))
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Team, Error> {
        let team = query_as(&format!("SELECT {} FROM teams AS t WHERE t.id = $1 FOR UPDATE", TEAM_COLUMNS))
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        team.ok_or_else(|| Error::NotFound(format!("team {}", id)))
    }

    async fn query(&mut self) -> Result<Vec<Team>, Error> {
        let teams = query_as(&format!("SELECT {} FROM teams AS t ORDER BY t.created_at DESC", TEAM_COLUMNS))
            .fetch_all(&mut self.executor)
            .await?;
        Ok(teams)
    }

    async fn exists_for_idea(&mut self, idea_id: i32) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM teams WHERE idea_id = $1)")
            .bind(idea_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn members(&mut self, team_id: i32) -> Result<Vec<TeamMember>, Error> {
        let members = query_as("SELECT * FROM team_members WHERE team_id = $1 ORDER BY joined_at")
            .bind(team_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(members)
    }

    async fn is_member(&mut self, team_id: i32, user_id: i32) -> Result<bool, Error> {
        let res = query_scalar("SELECT EXISTS(SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2)")
            .bind(team_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(res)
    }

    async fn add_member(&mut self, team_id: i32, user_id: i32) -> Result<(), Error> {
        query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
            .bind(team_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await
            .map_err(|e| Error::from_insert(e, "already a member of this team"))?;
        Ok(())
    }

    async fn remove_member(&mut self, team_id: i32, user_id: i32) -> Result<u64, Error> {
        let res = query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?;
        Ok(res.rows_affected())
    }
}

impl<E> ProjectCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: ProjectInsert) -> Result<Project, Error> {
        let id: i32 = query_scalar(
            "INSERT INTO projects (team_id, title, description, repo_url, demo_url, video_url, presentation_url, track)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id",
        )
        .bind(data.team_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.repo_url)
        .bind(data.demo_url)
        .bind(data.video_url)
        .bind(data.presentation_url)
        .bind(data.track)
        .fetch_one(&mut self.executor)
        .await?;
        ProjectCommon::get(self, id).await
    }

    async fn get(&mut self, id: i32) -> Result<Project, Error> {
        let project = query_as(&format!("SELECT {} FROM projects AS p WHERE p.id = $1", PROJECT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        project.ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }

    async fn query(&mut self, query: &ProjectQuery) -> Result<Vec<Project>, Error> {
        let mut stmt = QueryBuilder::new(format!("SELECT {} FROM projects AS p", PROJECT_COLUMNS));
        stmt.push(match query.order {
            ProjectOrder::Recent => " ORDER BY p.submitted_at DESC",
            ProjectOrder::ShowcaseVotes => " ORDER BY showcase_vote_count DESC",
            ProjectOrder::JudgesScore => " ORDER BY p.judges_score DESC",
            ProjectOrder::JudgeVotes => " ORDER BY judge_vote_count DESC",
        });
        if let Some(limit) = query.limit {
            stmt.push(" LIMIT ").push_bind(limit);
        }
        let projects = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(projects)
    }

    async fn set_judges_score(&mut self, id: i32, score: f64) -> Result<u64, Error> {
        let res = query("UPDATE projects SET judges_score = $1 WHERE id = $2").bind(score).bind(id).execute(&mut self.executor).await?;
        Ok(res.rows_affected())
    }

    async fn clear_winners(&mut self) -> Result<(), Error> {
        query("UPDATE projects SET is_winner = FALSE, winner_category = NULL WHERE is_winner OR winner_category IS NOT NULL")
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn mark_winner(&mut self, id: i32, category: WinnerCategory) -> Result<(), Error> {
        query("UPDATE projects SET is_winner = TRUE, winner_category = $1 WHERE id = $2")
            .bind(category.as_str())
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> ShowcaseVoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn exists(&mut self, project_id: i32, user_id: i32) -> Result<bool, Error> {
        let res = query_scalar("SELECT EXISTS(SELECT * FROM showcase_votes WHERE project_id = $1 AND voter_id = $2)")
            .bind(project_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(res)
    }

    async fn insert(&mut self, project_id: i32, user_id: i32) -> Result<(), Error> {
        query("INSERT INTO showcase_votes (project_id, voter_id) VALUES ($1, $2)")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await
            .map_err(|e| Error::from_insert(e, "already voted for this project"))?;
        Ok(())
    }

    async fn delete(&mut self, project_id: i32, user_id: i32) -> Result<u64, Error> {
        let res = query("DELETE FROM showcase_votes WHERE project_id = $1 AND voter_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?;
        Ok(res.rows_affected())
    }

    async fn voted_projects(&mut self, user_id: i32) -> Result<Vec<i32>, Error> {
        let ids = query_scalar("SELECT project_id FROM showcase_votes WHERE voter_id = $1")
            .bind(user_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(ids)
    }
}

impl<E> JudgeVoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn query(&mut self, judge_name: &str) -> Result<Vec<JudgeVote>, Error> {
        let rows: Vec<JudgeVoteRow> = query_as("SELECT project_id, judge_name, rank FROM judge_votes WHERE judge_name = $1 ORDER BY rank")
            .bind(judge_name)
            .fetch_all(&mut self.executor)
            .await?;
        rows.into_iter().map(JudgeVote::try_from).collect()
    }

    async fn insert(&mut self, vote: JudgeVote) -> Result<(), Error> {
        query("INSERT INTO judge_votes (project_id, judge_name, rank) VALUES ($1, $2, $3)")
            .bind(vote.project_id)
            .bind(vote.judge_name)
            .bind(vote.rank.value())
            .execute(&mut self.executor)
            .await
            .map_err(|e| Error::from_insert(e, "rank already assigned"))?;
        Ok(())
    }

    async fn delete_by_project(&mut self, project_id: i32, judge_name: &str) -> Result<u64, Error> {
        let res = query("DELETE FROM judge_votes WHERE project_id = $1 AND judge_name = $2")
            .bind(project_id)
            .bind(judge_name)
            .execute(&mut self.executor)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_by_rank(&mut self, judge_name: &str, rank: Rank) -> Result<u64, Error> {
        let res = query("DELETE FROM judge_votes WHERE judge_name = $1 AND rank = $2")
            .bind(judge_name)
            .bind(rank.value())
            .execute(&mut self.executor)
            .await?;
        Ok(res.rows_affected())
    }
}

impl<E> PhaseCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn query(&mut self) -> Result<Vec<Phase>, Error> {
        let rows: Vec<PhaseRow> = query_as("SELECT phase_name, is_open, updated_at FROM admin_phases ORDER BY phase_name")
            .fetch_all(&mut self.executor)
            .await?;
        let phases = rows
            .into_iter()
            .filter_map(|row| match Phase::try_from(row) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("skipping admin_phases row: {}", e);
                    None
                }
            })
            .collect();
        Ok(phases)
    }

    async fn upsert(&mut self, name: PhaseName, is_open: bool, at: DateTime<Utc>) -> Result<(), Error> {
        query(
            "INSERT INTO admin_phases (phase_name, is_open, updated_at) VALUES ($1, $2, $3)
            ON CONFLICT (phase_name) DO UPDATE SET is_open = EXCLUDED.is_open, updated_at = EXCLUDED.updated_at",
        )
        .bind(name.as_str())
        .bind(is_open)
        .bind(at)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }
}

impl<E> FeedbackCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: FeedbackInsert) -> Result<Feedback, Error> {
        let row: FeedbackRow = query_as(
            "INSERT INTO feedback (user_id, project_id, category, description, severity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, project_id, category, description, severity, created_at",
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.category.as_str())
        .bind(data.description)
        .bind(data.severity.map(|s| s.as_str()))
        .fetch_one(&mut self.executor)
        .await?;
        Feedback::try_from(row)
    }

    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Feedback>, Error> {
        let mut stmt = QueryBuilder::new("SELECT id, user_id, project_id, category, description, severity, created_at FROM feedback ORDER BY created_at DESC");
        if let Some(p) = pagination {
            stmt.push(" LIMIT ").push_bind(p.limit);
            stmt.push(" OFFSET ").push_bind(p.offset);
        }
        let rows: Vec<FeedbackRow> = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        rows.into_iter().map(Feedback::try_from).collect()
    }

    async fn count(&mut self) -> Result<i64, Error> {
        let n = query_scalar("SELECT COUNT(*) FROM feedback").fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let res = query("DELETE FROM feedback WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(res.rows_affected())
    }
}

pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx { executor: tx })
    }

    pub async fn acquire(&self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx { executor: conn })
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Common for PgSqlx<Transaction<'a, Postgres>> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Store for PgSqlx<Transaction<'a, Postgres>> {}

impl<'a> TxStore for PgSqlx<Transaction<'a, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

impl<'a> Manager<'a, PgSqlx<PoolConnection<Postgres>>, PgSqlx<Transaction<'static, Postgres>>> for PgSqlxManager {
    async fn db(&'a self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        self.acquire().await
    }

    async fn tx(&'a self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        self.begin().await
    }
}
