//! In-memory storage implementations

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

use chrono::Utc;
use roomshare_core::query::lookup;
use roomshare_core::{
    Direction, Filter, Query, RequestId, RequestStatus, Room, RoomId, RoomRequest, RoomUpdate,
    RoommateProfile, User, UserId,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{
    PendingVerification, RequestStore, RoomStore, Session, SessionId, SessionStore, StoreResult,
    UserStore,
};
use crate::error::MarketError;

/// A document plus its insertion sequence, used to break sort ties
struct Stored<T> {
    seq: u64,
    doc: T,
}

/// In-memory users, rooms and requests
pub struct InMemoryMarketStore {
    users: RwLock<HashMap<UserId, Stored<User>>>,
    rooms: RwLock<HashMap<RoomId, Stored<Room>>>,
    requests: RwLock<HashMap<RequestId, Stored<RoomRequest>>>,
    pending: RwLock<HashMap<String, PendingVerification>>,
    next_seq: AtomicU64,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            pending: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    fn seq(&self) -> u64 {
        self.next_seq.fetch_add(1, AtomicOrdering::SeqCst)
    }

    /// Change a user document in place
    fn update_user<F>(&self, user_id: UserId, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().unwrap();
        let stored = users
            .get_mut(&user_id)
            .ok_or(MarketError::NotFound("User"))?;
        f(&mut stored.doc);
        stored.doc.updated_at = Utc::now();
        Ok(())
    }

    /// Overwrite a request document (for repairing or seeding state in tests)
    pub fn put_request(&self, request: RoomRequest) {
        let seq = self.seq();
        self.requests
            .write()
            .unwrap()
            .insert(request.id, Stored { seq, doc: request });
    }
}

impl Default for InMemoryMarketStore {
    fn default() -> Self {
        Self::new()
    }
}

fn to_doc<T: Serialize>(doc: &T) -> StoreResult<Value> {
    serde_json::to_value(doc).map_err(MarketError::internal)
}

/// Filter, sort and page a collection the way the SQL backend does
fn run_query<'a, T, I>(items: I, query: &Query) -> StoreResult<Vec<T>>
where
    T: Serialize + Clone + 'a,
    I: Iterator<Item = &'a Stored<T>>,
{
    let mut hits: Vec<(u64, Value, &T)> = Vec::new();
    for item in items {
        let doc = to_doc(&item.doc)?;
        if query.filter.matches(&doc) {
            hits.push((item.seq, doc, &item.doc));
        }
    }

    hits.sort_by(|(seq_a, a, _), (seq_b, b, _)| {
        query.sort.compare(a, b).then_with(|| match query.sort.direction {
            Direction::Asc => seq_a.cmp(seq_b),
            Direction::Desc => seq_b.cmp(seq_a),
        })
    });

    Ok(hits
        .into_iter()
        .skip(usize::try_from(query.page.skip()).unwrap_or(usize::MAX))
        .take(query.page.limit as usize)
        .map(|(_, _, doc)| doc.clone())
        .collect())
}

fn count_matching<'a, T, I>(items: I, filter: &Filter) -> StoreResult<u64>
where
    T: Serialize + 'a,
    I: Iterator<Item = &'a Stored<T>>,
{
    let mut count = 0;
    for item in items {
        if filter.matches(&to_doc(&item.doc)?) {
            count += 1;
        }
    }
    Ok(count)
}

/// Newest first, later inserts winning ties
fn newest_first(mut requests: Vec<&Stored<RoomRequest>>) -> Vec<RoomRequest> {
    requests.sort_by(|a, b| match b.doc.created_at.cmp(&a.doc.created_at) {
        Ordering::Equal => b.seq.cmp(&a.seq),
        other => other,
    });
    requests.into_iter().map(|r| r.doc.clone()).collect()
}

impl UserStore for InMemoryMarketStore {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().unwrap();
        let email = user.email.to_lowercase();
        if users.values().any(|u| u.doc.email.to_lowercase() == email) {
            return Err(MarketError::Conflict("Email already registered".to_string()));
        }
        if users
            .values()
            .any(|u| u.doc.aadhar_number == user.aadhar_number)
        {
            return Err(MarketError::Conflict(
                "Aadhar number already registered".to_string(),
            ));
        }
        let seq = self.seq();
        users.insert(
            user.id,
            Stored {
                seq,
                doc: user.clone(),
            },
        );
        Ok(())
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .get(&user_id)
            .map(|u| u.doc.clone()))
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let normalized = email.trim().to_lowercase();
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| u.doc.email.to_lowercase() == normalized)
            .map(|u| u.doc.clone()))
    }

    fn set_verified(&self, user_id: UserId) -> StoreResult<()> {
        self.update_user(user_id, |u| u.is_verified = true)
    }

    fn set_roommate_profile(
        &self,
        user_id: UserId,
        profile: Option<RoommateProfile>,
    ) -> StoreResult<()> {
        self.update_user(user_id, |u| u.roommate_profile = profile)
    }

    fn add_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.update_user(user_id, |u| {
            if !u.listed_rooms.contains(&room_id) {
                u.listed_rooms.push(room_id);
            }
        })
    }

    fn remove_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.update_user(user_id, |u| u.listed_rooms.retain(|r| *r != room_id))
    }

    fn add_rented_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.update_user(user_id, |u| {
            if !u.rented_rooms.contains(&room_id) {
                u.rented_rooms.push(room_id);
            }
        })
    }

    fn find_users(&self, query: &Query) -> StoreResult<Vec<User>> {
        let users = self.users.read().unwrap();
        run_query(users.values(), query)
    }

    fn count_users(&self, filter: &Filter) -> StoreResult<u64> {
        let users = self.users.read().unwrap();
        count_matching(users.values(), filter)
    }

    fn create_pending(&self, pending: PendingVerification) -> StoreResult<()> {
        self.pending
            .write()
            .unwrap()
            .insert(pending.email.to_lowercase(), pending);
        Ok(())
    }

    fn get_pending(&self, email: &str) -> StoreResult<Option<PendingVerification>> {
        Ok(self
            .pending
            .read()
            .unwrap()
            .get(&email.trim().to_lowercase())
            .cloned())
    }

    fn delete_pending(&self, email: &str) -> StoreResult<()> {
        self.pending
            .write()
            .unwrap()
            .remove(&email.trim().to_lowercase());
        Ok(())
    }

    fn cleanup_expired_pending(&self, max_age_minutes: i64) -> StoreResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::minutes(max_age_minutes);
        let mut pending = self.pending.write().unwrap();
        let before = pending.len();
        pending.retain(|_, p| p.created_at > cutoff);
        Ok((before - pending.len()) as u64)
    }
}

impl RoomStore for InMemoryMarketStore {
    fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let seq = self.seq();
        self.rooms.write().unwrap().insert(
            room.id,
            Stored {
                seq,
                doc: room.clone(),
            },
        );
        Ok(())
    }

    fn get_room(&self, room_id: RoomId) -> StoreResult<Option<Room>> {
        Ok(self
            .rooms
            .read()
            .unwrap()
            .get(&room_id)
            .map(|r| r.doc.clone()))
    }

    fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> StoreResult<Room> {
        let mut rooms = self.rooms.write().unwrap();
        let stored = rooms
            .get_mut(&room_id)
            .ok_or(MarketError::NotFound("Room"))?;
        let mut room = stored.doc.clone();
        update.apply(&mut room)?;
        stored.doc = room.clone();
        Ok(room)
    }

    fn delete_room(&self, room_id: RoomId) -> StoreResult<bool> {
        Ok(self.rooms.write().unwrap().remove(&room_id).is_some())
    }

    fn occupy_room(&self, room_id: RoomId, roommate: UserId) -> StoreResult<bool> {
        let mut rooms = self.rooms.write().unwrap();
        let stored = rooms
            .get_mut(&room_id)
            .ok_or(MarketError::NotFound("Room"))?;
        Ok(stored.doc.occupy(roommate))
    }

    fn find_rooms(&self, query: &Query) -> StoreResult<Vec<Room>> {
        let rooms = self.rooms.read().unwrap();
        run_query(rooms.values(), query)
    }

    fn count_rooms(&self, filter: &Filter) -> StoreResult<u64> {
        let rooms = self.rooms.read().unwrap();
        count_matching(rooms.values(), filter)
    }

    fn distinct_cities(&self, filter: &Filter) -> StoreResult<Vec<String>> {
        let rooms = self.rooms.read().unwrap();
        let mut cities = BTreeSet::new();
        for stored in rooms.values() {
            let doc = to_doc(&stored.doc)?;
            if filter.matches(&doc) {
                if let Some(city) = lookup(&doc, "address.city").and_then(Value::as_str) {
                    cities.insert(city.to_string());
                }
            }
        }
        Ok(cities.into_iter().collect())
    }

    fn rooms_by_owner(&self, owner: UserId) -> StoreResult<Vec<Room>> {
        let rooms = self.rooms.read().unwrap();
        let mut owned: Vec<&Stored<Room>> =
            rooms.values().filter(|r| r.doc.owner == owner).collect();
        owned.sort_by_key(|r| r.seq);
        Ok(owned.into_iter().map(|r| r.doc.clone()).collect())
    }
}

impl RequestStore for InMemoryMarketStore {
    fn insert_request(&self, request: &RoomRequest) -> StoreResult<()> {
        // Check and insert under one write lock so concurrent duplicates collide
        let mut requests = self.requests.write().unwrap();
        if request.status == RequestStatus::Pending
            && requests.values().any(|r| {
                r.doc.room == request.room
                    && r.doc.requester == request.requester
                    && r.doc.status == RequestStatus::Pending
            })
        {
            return Err(MarketError::Conflict(
                "You already have a pending request for this room".to_string(),
            ));
        }
        let seq = self.seq();
        requests.insert(
            request.id,
            Stored {
                seq,
                doc: request.clone(),
            },
        );
        Ok(())
    }

    fn get_request(&self, request_id: RequestId) -> StoreResult<Option<RoomRequest>> {
        Ok(self
            .requests
            .read()
            .unwrap()
            .get(&request_id)
            .map(|r| r.doc.clone()))
    }

    fn find_pending_request(
        &self,
        room_id: RoomId,
        requester: UserId,
    ) -> StoreResult<Option<RoomRequest>> {
        let requests = self.requests.read().unwrap();
        Ok(requests
            .values()
            .find(|r| {
                r.doc.room == room_id
                    && r.doc.requester == requester
                    && r.doc.status == RequestStatus::Pending
            })
            .map(|r| r.doc.clone()))
    }

    fn update_request_status(
        &self,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<bool> {
        let mut requests = self.requests.write().unwrap();
        match requests.get_mut(&request_id) {
            Some(stored) if stored.doc.status == from => {
                stored.doc.status = to;
                stored.doc.updated_at = Utc::now();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(MarketError::NotFound("Request")),
        }
    }

    fn requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<RoomRequest>> {
        let requests = self.requests.read().unwrap();
        Ok(newest_first(
            requests
                .values()
                .filter(|r| r.doc.requester == requester)
                .collect(),
        ))
    }

    fn requests_for_owner(
        &self,
        owner: UserId,
        status: Option<RequestStatus>,
    ) -> StoreResult<Vec<RoomRequest>> {
        let requests = self.requests.read().unwrap();
        Ok(newest_first(
            requests
                .values()
                .filter(|r| r.doc.owner == owner && status.map_or(true, |s| r.doc.status == s))
                .collect(),
        ))
    }

    fn requests_with_status(&self, status: RequestStatus) -> StoreResult<Vec<RoomRequest>> {
        let requests = self.requests.read().unwrap();
        let mut matching: Vec<&Stored<RoomRequest>> =
            requests.values().filter(|r| r.doc.status == status).collect();
        matching.sort_by_key(|r| r.seq);
        Ok(matching.into_iter().map(|r| r.doc.clone()).collect())
    }
}

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user_id: UserId) -> StoreResult<Session> {
        let session = Session {
            id: SessionId(Uuid::new_v4().to_string()),
            user_id,
            created_at: Utc::now(),
        };
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().unwrap().get(session_id).cloned())
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        self.sessions.write().unwrap().remove(session_id);
        Ok(())
    }
}
