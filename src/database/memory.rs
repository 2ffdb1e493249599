//! In-memory store used by the service tests. Mirrors the unique indexes and
//! derived counters of the Postgres schema.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

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
    Common, FeedbackCommon, IdeaCommon, IdeaVoteCommon, JudgeVoteCommon, PhaseCommon, ProjectCommon, ShowcaseVoteCommon, Store, TeamCommon, TxStore, UserCommon,
};
use crate::error::Error;

#[derive(Debug, Clone)]
struct IdeaVoteRow {
    id: i32,
    idea_id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    seq: i32,
    users: Vec<User>,
    ideas: Vec<Idea>,
    idea_votes: Vec<IdeaVoteRow>,
    teams: Vec<Team>,
    members: Vec<TeamMember>,
    projects: Vec<Project>,
    showcase_votes: Vec<(i32, i32)>,
    judge_votes: Vec<JudgeVote>,
    phases: Vec<Phase>,
    feedback: Vec<Feedback>,
    fail_on: Option<&'static str>,
}

impl Tables {
    fn next(&mut self) -> (i32, DateTime<Utc>) {
        self.seq += 1;
        let at = Utc.timestamp_opt(1_764_000_000 + i64::from(self.seq), 0).unwrap();
        (self.seq, at)
    }

    fn idea(&self, idea: &Idea) -> Idea {
        let mut idea = idea.clone();
        idea.vote_count = self.idea_votes.iter().filter(|v| v.idea_id == idea.id).count() as i64;
        idea
    }

    fn team(&self, team: &Team) -> Team {
        let mut team = team.clone();
        team.member_count = self.members.iter().filter(|m| m.team_id == team.id).count() as i64;
        team
    }

    fn project(&self, project: &Project) -> Project {
        let mut project = project.clone();
        project.showcase_vote_count = self.showcase_votes.iter().filter(|(p, _)| *p == project.id).count() as i64;
        project.judge_vote_count = self.judge_votes.iter().filter(|v| v.project_id == project.id).map(|v| v.rank.points()).sum();
        project
    }
}

/// Row locks taken by `get_for_update`, keyed by table and id, valued by the holding transaction.
#[derive(Debug, Default)]
struct RowLocks {
    next_tx: u64,
    held: HashMap<(&'static str, i32), u64>,
}

pub struct MemStore {
    tables: Rc<RefCell<Tables>>,
    locks: Rc<RefCell<RowLocks>>,
    tx: Option<u64>,
    snapshot: Option<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: Rc::new(RefCell::new(Tables::default())),
            locks: Rc::new(RefCell::new(RowLocks::default())),
            tx: None,
            snapshot: None,
        }
    }

    /// Another connection onto the same tables.
    pub fn handle(&self) -> Self {
        Self {
            tables: self.tables.clone(),
            locks: self.locks.clone(),
            tx: None,
            snapshot: None,
        }
    }

    /// A transaction onto the same tables; `rollback` restores the state seen here.
    pub fn begin(&self) -> Self {
        let tx = {
            let mut locks = self.locks.borrow_mut();
            locks.next_tx += 1;
            locks.next_tx
        };
        Self {
            tables: self.tables.clone(),
            locks: self.locks.clone(),
            tx: Some(tx),
            snapshot: Some(self.tables.borrow().clone()),
        }
    }

    /// Waits until no other transaction holds the row, then holds it until commit or rollback.
    /// Outside a transaction the lock ends with the statement, so nothing is held.
    async fn lock_row(&self, table: &'static str, id: i32) {
        let Some(tx) = self.tx else {
            return;
        };
        loop {
            {
                let mut locks = self.locks.borrow_mut();
                let free = locks.held.get(&(table, id)).map_or(true, |owner| *owner == tx);
                if free {
                    locks.held.insert((table, id), tx);
                    return;
                }
            }
            tokio::task::yield_now().await;
        }
    }

    fn release_rows(&self) {
        if let Some(tx) = self.tx {
            self.locks.borrow_mut().held.retain(|_, owner| *owner != tx);
        }
    }

    /// Makes the next call of the named operation fail once.
    pub fn fail_on(&self, op: &'static str) {
        self.tables.borrow_mut().fail_on = Some(op);
    }

    /// Ids of the live vote tokens of a pair, oldest first.
    pub fn idea_vote_ids(&self, idea_id: i32, user_id: i32) -> Vec<i32> {
        let tables = self.tables.borrow();
        tables.idea_votes.iter().filter(|v| v.idea_id == idea_id && v.user_id == user_id).map(|v| v.id).collect()
    }

    fn check(&self, op: &'static str) -> Result<(), Error> {
        let mut tables = self.tables.borrow_mut();
        if tables.fail_on == Some(op) {
            tables.fail_on = None;
            return Err(Error::ServerError(format!("injected failure: {}", op)));
        }
        Ok(())
    }
}

impl UserCommon for MemStore {
    async fn get(&mut self, id: i32) -> Result<User, Error> {
        let tables = self.tables.borrow();
        tables.users.iter().find(|u| u.id == id).cloned().ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }

    async fn get_by_name(&mut self, name: &str) -> Result<Option<User>, Error> {
        Ok(self.tables.borrow().users.iter().find(|u| u.name == name).cloned())
    }

    async fn insert(&mut self, name: &str) -> Result<User, Error> {
        self.check("users.insert")?;
        let mut tables = self.tables.borrow_mut();
        if tables.users.iter().any(|u| u.name == name) {
            return Err(Error::Duplicate("This name is already taken. Please choose another.".into()));
        }
        let (id, at) = tables.next();
        let user = User {
            id,
            name: name.into(),
            created_at: at,
            last_seen_at: at,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn touch(&mut self, id: i32, at: DateTime<Utc>) -> Result<(), Error> {
        let mut tables = self.tables.borrow_mut();
        if let Some(u) = tables.users.iter_mut().find(|u| u.id == id) {
            u.last_seen_at = at;
        }
        Ok(())
    }
}

impl IdeaCommon for MemStore {
    async fn insert(&mut self, data: IdeaInsert) -> Result<Idea, Error> {
        let mut tables = self.tables.borrow_mut();
        let (id, at) = tables.next();
        let idea = Idea {
            id,
            title: data.title,
            description: data.description,
            user_id: data.user_id,
            vote_count: 0,
            is_locked: false,
            created_at: at,
        };
        tables.ideas.push(idea.clone());
        Ok(idea)
    }

    async fn get(&mut self, id: i32) -> Result<Idea, Error> {
        let tables = self.tables.borrow();
        let idea = tables.ideas.iter().find(|i| i.id == id).ok_or_else(|| Error::NotFound(format!("idea {}", id)))?;
        Ok(tables.idea(idea))
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Idea, Error> {
        self.lock_row("ideas", id).await;
        IdeaCommon::get(self, id).await
    }

    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Idea>, Error> {
        let tables = self.tables.borrow();
        let mut ideas: Vec<Idea> = tables.ideas.iter().map(|i| tables.idea(i)).collect();
        ideas.sort_by(|a, b| b.vote_count.cmp(&a.vote_count).then(a.created_at.cmp(&b.created_at)));
        Ok(match pagination {
            Some(p) => ideas.into_iter().skip(p.offset as usize).take(p.limit as usize).collect(),
            None => ideas,
        })
    }

    async fn count(&mut self) -> Result<i64, Error> {
        Ok(self.tables.borrow().ideas.len() as i64)
    }

    async fn lock(&mut self, id: i32) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        Ok(tables.ideas.iter_mut().filter(|i| i.id == id).map(|i| i.is_locked = true).count() as u64)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        if tables.teams.iter().any(|t| t.idea_id == id) {
            return Err(Error::Duplicate("a team has been formed around this idea".into()));
        }
        let before = tables.ideas.len();
        tables.ideas.retain(|i| i.id != id);
        tables.idea_votes.retain(|v| v.idea_id != id);
        Ok((before - tables.ideas.len()) as u64)
    }
}

impl IdeaVoteCommon for MemStore {
    async fn count(&mut self, idea_id: i32, user_id: i32) -> Result<i64, Error> {
        let n = {
            let tables = self.tables.borrow();
            tables.idea_votes.iter().filter(|v| v.idea_id == idea_id && v.user_id == user_id).count() as i64
        };
        // a round trip: other connections may write before the caller sees the answer
        tokio::task::yield_now().await;
        Ok(n)
    }

    async fn insert_many(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<(), Error> {
        self.check("idea_votes.insert")?;
        let mut tables = self.tables.borrow_mut();
        for _ in 0..n {
            let (id, created_at) = tables.next();
            tables.idea_votes.push(IdeaVoteRow { id, idea_id, user_id, created_at });
        }
        Ok(())
    }

    async fn delete_latest(&mut self, idea_id: i32, user_id: i32, n: i64) -> Result<u64, Error> {
        self.check("idea_votes.delete")?;
        let mut tables = self.tables.borrow_mut();
        let mut mine: Vec<(DateTime<Utc>, i32)> = tables
            .idea_votes
            .iter()
            .filter(|v| v.idea_id == idea_id && v.user_id == user_id)
            .map(|v| (v.created_at, v.id))
            .collect();
        mine.sort_by(|a, b| b.cmp(a));
        let doomed: Vec<i32> = mine.into_iter().take(n as usize).map(|(_, id)| id).collect();
        tables.idea_votes.retain(|v| !doomed.contains(&v.id));
        Ok(doomed.len() as u64)
    }

    async fn tallies(&mut self, user_id: i32) -> Result<Vec<VoteTally>, Error> {
        let tables = self.tables.borrow();
        let mut tallies: Vec<VoteTally> = Vec::new();
        for v in tables.idea_votes.iter().filter(|v| v.user_id == user_id) {
            match tallies.iter_mut().find(|t| t.idea_id == v.idea_id) {
                Some(t) => t.count += 1,
                None => tallies.push(VoteTally { idea_id: v.idea_id, count: 1 }),
            }
        }
        Ok(tallies)
    }
}

impl TeamCommon for MemStore {
    async fn insert(&mut self, data: TeamInsert) -> Result<Team, Error> {
        self.check("teams.insert")?;
        let mut tables = self.tables.borrow_mut();
        if tables.teams.iter().any(|t| t.idea_id == data.idea_id) {
            return Err(Error::Duplicate("A team already exists for this idea".into()));
        }
        let (id, at) = tables.next();
        let team = Team {
            id,
            name: data.name,
            description: data.description,
            leader_id: data.leader_id,
            idea_id: data.idea_id,
            max_members: data.max_members,
            member_count: 0,
            created_at: at,
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn get(&mut self, id: i32) -> Result<Team, Error> {
        let tables = self.tables.borrow();
        let team = tables.teams.iter().find(|t| t.id == id).ok_or_else(|| Error::NotFound(format!("team {}", id)))?;
        Ok(tables.team(team))
    }

    async fn get_for_update(&mut self, id: i32) -> Result<Team, Error> {
        self.lock_row("teams", id).await;
        TeamCommon::get(self, id).await
    }

    async fn query(&mut self) -> Result<Vec<Team>, Error> {
        let tables = self.tables.borrow();
        Ok(tables.teams.iter().rev().map(|t| tables.team(t)).collect())
    }

    async fn exists_for_idea(&mut self, idea_id: i32) -> Result<bool, Error> {
        Ok(self.tables.borrow().teams.iter().any(|t| t.idea_id == idea_id))
    }

    async fn members(&mut self, team_id: i32) -> Result<Vec<TeamMember>, Error> {
        Ok(self.tables.borrow().members.iter().filter(|m| m.team_id == team_id).cloned().collect())
    }

    async fn is_member(&mut self, team_id: i32, user_id: i32) -> Result<bool, Error> {
        Ok(self.tables.borrow().members.iter().any(|m| m.team_id == team_id && m.user_id == user_id))
    }

    async fn add_member(&mut self, team_id: i32, user_id: i32) -> Result<(), Error> {
        self.check("team_members.insert")?;
        let mut tables = self.tables.borrow_mut();
        if tables.members.iter().any(|m| m.team_id == team_id && m.user_id == user_id) {
            return Err(Error::Duplicate("already a member of this team".into()));
        }
        let (id, joined_at) = tables.next();
        tables.members.push(TeamMember { id, team_id, user_id, joined_at });
        Ok(())
    }

    async fn remove_member(&mut self, team_id: i32, user_id: i32) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.members.len();
        tables.members.retain(|m| !(m.team_id == team_id && m.user_id == user_id));
        Ok((before - tables.members.len()) as u64)
    }
}

impl ProjectCommon for MemStore {
    async fn insert(&mut self, data: ProjectInsert) -> Result<Project, Error> {
        let mut tables = self.tables.borrow_mut();
        let (id, at) = tables.next();
        let project = Project {
            id,
            team_id: data.team_id,
            title: data.title,
            description: data.description,
            repo_url: data.repo_url,
            demo_url: data.demo_url,
            video_url: data.video_url,
            presentation_url: data.presentation_url,
            track: data.track,
            judges_score: 0.0,
            showcase_vote_count: 0,
            judge_vote_count: 0,
            is_winner: false,
            winner_category: None,
            submitted_at: at,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn get(&mut self, id: i32) -> Result<Project, Error> {
        let tables = self.tables.borrow();
        let project = tables.projects.iter().find(|p| p.id == id).ok_or_else(|| Error::NotFound(format!("project {}", id)))?;
        Ok(tables.project(project))
    }

    async fn query(&mut self, query: &ProjectQuery) -> Result<Vec<Project>, Error> {
        let tables = self.tables.borrow();
        let mut projects: Vec<Project> = tables.projects.iter().map(|p| tables.project(p)).collect();
        match query.order {
            ProjectOrder::Recent => projects.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at)),
            ProjectOrder::ShowcaseVotes => projects.sort_by(|a, b| b.showcase_vote_count.cmp(&a.showcase_vote_count)),
            ProjectOrder::JudgesScore => projects.sort_by(|a, b| b.judges_score.total_cmp(&a.judges_score)),
            ProjectOrder::JudgeVotes => projects.sort_by(|a, b| b.judge_vote_count.cmp(&a.judge_vote_count)),
        }
        if let Some(limit) = query.limit {
            projects.truncate(limit as usize);
        }
        Ok(projects)
    }

    async fn set_judges_score(&mut self, id: i32, score: f64) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        Ok(tables.projects.iter_mut().filter(|p| p.id == id).map(|p| p.judges_score = score).count() as u64)
    }

    async fn clear_winners(&mut self) -> Result<(), Error> {
        for p in self.tables.borrow_mut().projects.iter_mut() {
            p.is_winner = false;
            p.winner_category = None;
        }
        Ok(())
    }

    async fn mark_winner(&mut self, id: i32, category: WinnerCategory) -> Result<(), Error> {
        self.check("projects.mark_winner")?;
        for p in self.tables.borrow_mut().projects.iter_mut().filter(|p| p.id == id) {
            p.is_winner = true;
            p.winner_category = Some(category.as_str().into());
        }
        Ok(())
    }
}

impl ShowcaseVoteCommon for MemStore {
    async fn exists(&mut self, project_id: i32, user_id: i32) -> Result<bool, Error> {
        Ok(self.tables.borrow().showcase_votes.contains(&(project_id, user_id)))
    }

    async fn insert(&mut self, project_id: i32, user_id: i32) -> Result<(), Error> {
        let mut tables = self.tables.borrow_mut();
        if tables.showcase_votes.contains(&(project_id, user_id)) {
            return Err(Error::Duplicate("already voted for this project".into()));
        }
        tables.showcase_votes.push((project_id, user_id));
        Ok(())
    }

    async fn delete(&mut self, project_id: i32, user_id: i32) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.showcase_votes.len();
        tables.showcase_votes.retain(|v| *v != (project_id, user_id));
        Ok((before - tables.showcase_votes.len()) as u64)
    }

    async fn voted_projects(&mut self, user_id: i32) -> Result<Vec<i32>, Error> {
        Ok(self.tables.borrow().showcase_votes.iter().filter(|(_, u)| *u == user_id).map(|(p, _)| *p).collect())
    }
}

impl JudgeVoteCommon for MemStore {
    async fn query(&mut self, judge_name: &str) -> Result<Vec<JudgeVote>, Error> {
        let mut votes: Vec<JudgeVote> = self.tables.borrow().judge_votes.iter().filter(|v| v.judge_name == judge_name).cloned().collect();
        votes.sort_by_key(|v| v.rank);
        Ok(votes)
    }

    async fn insert(&mut self, vote: JudgeVote) -> Result<(), Error> {
        self.check("judge_votes.insert")?;
        let mut tables = self.tables.borrow_mut();
        let clash = tables
            .judge_votes
            .iter()
            .any(|v| v.judge_name == vote.judge_name && (v.project_id == vote.project_id || v.rank == vote.rank));
        if clash {
            return Err(Error::Duplicate("rank already assigned".into()));
        }
        tables.judge_votes.push(vote);
        Ok(())
    }

    async fn delete_by_project(&mut self, project_id: i32, judge_name: &str) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.judge_votes.len();
        tables.judge_votes.retain(|v| !(v.project_id == project_id && v.judge_name == judge_name));
        Ok((before - tables.judge_votes.len()) as u64)
    }

    async fn delete_by_rank(&mut self, judge_name: &str, rank: Rank) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.judge_votes.len();
        tables.judge_votes.retain(|v| !(v.judge_name == judge_name && v.rank == rank));
        Ok((before - tables.judge_votes.len()) as u64)
    }
}

impl PhaseCommon for MemStore {
    async fn query(&mut self) -> Result<Vec<Phase>, Error> {
        self.check("admin_phases.query")?;
        Ok(self.tables.borrow().phases.clone())
    }

    async fn upsert(&mut self, name: PhaseName, is_open: bool, at: DateTime<Utc>) -> Result<(), Error> {
        let mut tables = self.tables.borrow_mut();
        match tables.phases.iter_mut().find(|p| p.name == name) {
            Some(p) => {
                p.is_open = is_open;
                p.updated_at = at;
            }
            None => tables.phases.push(Phase { name, is_open, updated_at: at }),
        }
        Ok(())
    }
}

impl FeedbackCommon for MemStore {
    async fn insert(&mut self, data: FeedbackInsert) -> Result<Feedback, Error> {
        let mut tables = self.tables.borrow_mut();
        let (id, created_at) = tables.next();
        let feedback = Feedback {
            id,
            user_id: data.user_id,
            project_id: data.project_id,
            category: data.category,
            description: data.description,
            severity: data.severity,
            created_at,
        };
        tables.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn query(&mut self, pagination: Option<Pagination>) -> Result<Vec<Feedback>, Error> {
        let tables = self.tables.borrow();
        let all = tables.feedback.iter().rev().cloned();
        Ok(match pagination {
            Some(p) => all.skip(p.offset as usize).take(p.limit as usize).collect(),
            None => all.collect(),
        })
    }

    async fn count(&mut self) -> Result<i64, Error> {
        Ok(self.tables.borrow().feedback.len() as i64)
    }

    async fn delete(&mut self, id: i32) -> Result<u64, Error> {
        let mut tables = self.tables.borrow_mut();
        let before = tables.feedback.len();
        tables.feedback.retain(|f| f.id != id);
        Ok((before - tables.feedback.len()) as u64)
    }
}

impl Common for MemStore {}
impl Store for MemStore {}

impl TxStore for MemStore {
    async fn commit(mut self) -> Result<(), Error> {
        self.snapshot = None;
        self.release_rows();
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), Error> {
        if let Some(snapshot) = self.snapshot.take() {
            *self.tables.borrow_mut() = snapshot;
        }
        self.release_rows();
        Ok(())
    }
}
