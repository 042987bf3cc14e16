//! Yards, motorcycles and users

use chrono::Utc;
use std::collections::BTreeSet;

use super::{Page, PageRequest, Store};
use crate::domain::{
    Id, Motorcycle, MotorcycleInput, Position, Role, User, UserInput, Yard, YardInput,
};
use crate::error::{Result, YardError};

impl Store {
    // ---- yards ----

    pub async fn list_yards(&self, request: PageRequest) -> Page<Yard> {
        self.yards.page(request).await
    }

    pub async fn get_yard(&self, id: Id) -> Result<Yard> {
        self.yards
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("yard", id))
    }

    /// Yards that at least one user, position or fixed marker points at.
    pub async fn yards_with_relations(&self, request: PageRequest) -> Page<Yard> {
        let yards = self.yards.rows.read().await;
        let users = self.users.rows.read().await;
        let markers = self.fixed_markers.rows.read().await;
        let positions = self.positions.rows.read().await;

        let referenced: BTreeSet<Id> = users
            .values()
            .filter_map(|u| u.yard_id)
            .chain(markers.values().filter_map(|m| m.yard_id))
            .chain(positions.values().filter_map(|p| p.yard_id))
            .collect();

        Page::from_ordered(
            yards
                .values()
                .filter(|y| referenced.contains(&y.id))
                .cloned(),
            request,
        )
    }

    /// Distinct motorcycles with at least one position recorded in the yard.
    pub async fn motorcycles_in_yard(&self, yard_id: Id) -> Result<Vec<Motorcycle>> {
        let yards = self.yards.rows.read().await;
        if !yards.contains_key(&yard_id) {
            return Err(YardError::not_found("yard", yard_id));
        }
        let motorcycles = self.motorcycles.rows.read().await;
        let positions = self.positions.rows.read().await;

        let ids: BTreeSet<Id> = positions
            .values()
            .filter(|p| p.yard_id == Some(yard_id))
            .filter_map(|p| p.motorcycle_id)
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| motorcycles.get(&id).cloned())
            .collect())
    }

    pub async fn create_yard(&self, input: YardInput) -> Result<Yard> {
        input.validate()?;
        let mut yards = self.yards.rows.write().await;
        let yard = input.into_yard(self.yards.next_id());
        yards.insert(yard.id, yard.clone());
        Ok(yard)
    }

    pub async fn update_yard(&self, id: Id, input: YardInput) -> Result<Yard> {
        input.validate()?;
        let mut yards = self.yards.rows.write().await;
        let yard = yards
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("yard", id))?;
        *yard = input.into_yard(id);
        Ok(yard.clone())
    }

    pub async fn delete_yard(&self, id: Id) -> Result<()> {
        let mut yards = self.yards.rows.write().await;
        if !yards.contains_key(&id) {
            return Err(YardError::not_found("yard", id));
        }
        let users = self.users.rows.read().await;
        let markers = self.fixed_markers.rows.read().await;
        let positions = self.positions.rows.read().await;

        let in_use = users.values().any(|u| u.yard_id == Some(id))
            || markers.values().any(|m| m.yard_id == Some(id))
            || positions.values().any(|p| p.yard_id == Some(id));
        if in_use {
            return Err(YardError::Conflict(format!(
                "yard {} is still referenced by users, markers or positions",
                id
            )));
        }
        yards.remove(&id);
        Ok(())
    }

    // ---- motorcycles ----

    pub async fn list_motorcycles(&self, request: PageRequest) -> Page<Motorcycle> {
        self.motorcycles.page(request).await
    }

    pub async fn get_motorcycle(&self, id: Id) -> Result<Motorcycle> {
        self.motorcycles
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("motorcycle", id))
    }

    pub async fn motorcycles_by_plate(&self, prefix: &str, request: PageRequest) -> Page<Motorcycle> {
        self.motorcycles
            .page_where(request, |m| m.plate.starts_with(prefix))
            .await
    }

    pub async fn motorcycles_by_status(&self, status: &str, request: PageRequest) -> Page<Motorcycle> {
        let wanted = status.to_lowercase();
        self.motorcycles
            .page_where(request, |m| m.status.to_lowercase() == wanted)
            .await
    }

    pub async fn positions_of_motorcycle(&self, motorcycle_id: Id) -> Result<Vec<Position>> {
        let motorcycles = self.motorcycles.rows.read().await;
        if !motorcycles.contains_key(&motorcycle_id) {
            return Err(YardError::not_found("motorcycle", motorcycle_id));
        }
        let positions = self.positions.rows.read().await;
        Ok(positions
            .values()
            .filter(|p| p.motorcycle_id == Some(motorcycle_id))
            .cloned()
            .collect())
    }

    pub async fn create_motorcycle(&self, input: MotorcycleInput) -> Result<Motorcycle> {
        input.validate()?;
        let mut motorcycles = self.motorcycles.rows.write().await;
        ensure_unique_plate(motorcycles.values(), &input.plate, None)?;

        let motorcycle = Motorcycle {
            id: self.motorcycles.next_id(),
            plate: input.plate,
            model: input.model,
            status: input.status,
            registered_at: Some(Utc::now()),
        };
        motorcycles.insert(motorcycle.id, motorcycle.clone());
        Ok(motorcycle)
    }

    /// Replaces plate, model and status. `registered_at` is kept.
    pub async fn update_motorcycle(&self, id: Id, input: MotorcycleInput) -> Result<Motorcycle> {
        input.check_path_id(id)?;
        input.validate()?;
        let mut motorcycles = self.motorcycles.rows.write().await;
        if !motorcycles.contains_key(&id) {
            return Err(YardError::not_found("motorcycle", id));
        }
        ensure_unique_plate(motorcycles.values(), &input.plate, Some(id))?;

        let motorcycle = motorcycles
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("motorcycle", id))?;
        motorcycle.plate = input.plate;
        motorcycle.model = input.model;
        motorcycle.status = input.status;
        Ok(motorcycle.clone())
    }

    pub async fn delete_motorcycle(&self, id: Id) -> Result<()> {
        let mut motorcycles = self.motorcycles.rows.write().await;
        if !motorcycles.contains_key(&id) {
            return Err(YardError::not_found("motorcycle", id));
        }
        let mobile_markers = self.mobile_markers.rows.read().await;
        let positions = self.positions.rows.read().await;

        if mobile_markers.values().any(|m| m.motorcycle_id == Some(id))
            || positions.values().any(|p| p.motorcycle_id == Some(id))
        {
            return Err(YardError::Conflict(format!(
                "motorcycle {} still has positions or a mobile marker",
                id
            )));
        }
        motorcycles.remove(&id);
        Ok(())
    }

    // ---- users ----

    pub async fn list_users(&self, request: PageRequest) -> Page<User> {
        self.users.page(request).await
    }

    pub async fn get_user(&self, id: Id) -> Result<User> {
        self.users
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("user", id))
    }

    /// Case-insensitive match on the trimmed address.
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let wanted = email.trim().to_lowercase();
        let users = self.users.rows.read().await;
        users
            .values()
            .find(|u| u.email.to_lowercase() == wanted)
            .cloned()
    }

    /// Inserts a user whose password has already been hashed.
    pub async fn create_user(&self, input: &UserInput, role: Role, password_hash: String) -> Result<User> {
        let yards = self.yards.rows.read().await;
        ensure_reference(&yards, "yard", input.yard_id)?;
        let mut users = self.users.rows.write().await;

        let email = input.normalized_email();
        ensure_unique_email(users.values(), &email, None)?;

        let user = User {
            id: self.users.next_id(),
            name: input.name.clone(),
            email,
            password_hash,
            status: input
                .status
                .clone()
                .unwrap_or_else(|| crate::domain::DEFAULT_USER_STATUS.to_string()),
            role,
            yard_id: input.yard_id,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn update_user(&self, id: Id, input: &UserInput, role: Role, password_hash: String) -> Result<User> {
        let yards = self.yards.rows.read().await;
        ensure_reference(&yards, "yard", input.yard_id)?;
        let mut users = self.users.rows.write().await;
        if !users.contains_key(&id) {
            return Err(YardError::not_found("user", id));
        }
        let email = input.normalized_email();
        ensure_unique_email(users.values(), &email, Some(id))?;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("user", id))?;
        user.name = input.name.clone();
        user.email = email;
        user.password_hash = password_hash;
        if let Some(status) = &input.status {
            user.status = status.clone();
        }
        user.role = role;
        user.yard_id = input.yard_id;
        Ok(user.clone())
    }

    pub(crate) async fn set_password_hash(&self, id: Id, password_hash: String) -> Result<()> {
        let mut users = self.users.rows.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("user", id))?;
        user.password_hash = password_hash;
        Ok(())
    }

    pub async fn delete_user(&self, id: Id) -> Result<()> {
        self.users
            .rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| YardError::not_found("user", id))
    }
}

/// A present foreign key must resolve to an existing row.
pub(super) fn ensure_reference<T>(
    rows: &std::collections::BTreeMap<Id, T>,
    kind: &str,
    id: Option<Id>,
) -> Result<()> {
    match id {
        Some(id) if !rows.contains_key(&id) => Err(YardError::Validation(format!(
            "{} {} does not exist",
            kind, id
        ))),
        _ => Ok(()),
    }
}

fn ensure_unique_plate<'a>(
    mut existing: impl Iterator<Item = &'a Motorcycle>,
    plate: &str,
    except: Option<Id>,
) -> Result<()> {
    if existing.any(|m| m.plate == plate && Some(m.id) != except) {
        return Err(YardError::Conflict(format!("plate {} is already registered", plate)));
    }
    Ok(())
}

fn ensure_unique_email<'a>(
    mut existing: impl Iterator<Item = &'a User>,
    email: &str,
    except: Option<Id>,
) -> Result<()> {
    let wanted = email.to_lowercase();
    if existing.any(|u| u.email.to_lowercase() == wanted && Some(u.id) != except) {
        return Err(YardError::Conflict("email is already registered".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionInput;

    fn moto(plate: &str, status: &str) -> MotorcycleInput {
        MotorcycleInput {
            id: None,
            plate: plate.to_string(),
            model: "Mottu Sport".to_string(),
            status: status.to_string(),
        }
    }

    fn yard(name: &str) -> YardInput {
        YardInput {
            name: name.to_string(),
            location: Some("Sao Paulo".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_plate_is_conflict() {
        let store = Store::new();
        store.create_motorcycle(moto("ABC1234", "ativa")).await.unwrap();
        let err = store.create_motorcycle(moto("ABC1234", "ativa")).await.unwrap_err();
        assert!(matches!(err, YardError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_requires_matching_body_id() {
        let store = Store::new();
        let created = store.create_motorcycle(moto("ABC1234", "ativa")).await.unwrap();

        let mut input = moto("XYZ9876", "ativa");
        input.id = Some(created.id + 1);
        let err = store.update_motorcycle(created.id, input).await.unwrap_err();
        assert!(matches!(err, YardError::Validation(_)));

        let mut input = moto("XYZ9876", "ativa");
        input.id = Some(created.id);
        let updated = store.update_motorcycle(created.id, input).await.unwrap();
        assert_eq!(updated.plate, "XYZ9876");
        assert_eq!(updated.registered_at, created.registered_at);
    }

    #[tokio::test]
    async fn test_plate_prefix_and_status_filters() {
        let store = Store::new();
        store.create_motorcycle(moto("ABC1234", "Ativa")).await.unwrap();
        store.create_motorcycle(moto("ABD5678", "REVISÃO")).await.unwrap();
        store.create_motorcycle(moto("XYZ0001", "ativa")).await.unwrap();

        let page = store.motorcycles_by_plate("AB", PageRequest::default()).await;
        assert_eq!(page.total, 2);

        let page = store.motorcycles_by_status("ATIVA", PageRequest::default()).await;
        assert_eq!(page.total, 2);

        let page = store.motorcycles_by_status("revisão", PageRequest::default()).await;
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_yards_with_relations_and_motorcycles_in_yard() {
        let store = Store::new();
        let a = store.create_yard(yard("A")).await.unwrap();
        let _b = store.create_yard(yard("B")).await.unwrap();
        let m = store.create_motorcycle(moto("ABC1234", "ativa")).await.unwrap();

        for _ in 0..2 {
            store
                .create_position(PositionInput {
                    recorded_at: None,
                    x: Some(1.0),
                    y: Some(2.0),
                    motorcycle_id: Some(m.id),
                    yard_id: Some(a.id),
                })
                .await
                .unwrap();
        }

        let page = store.yards_with_relations(PageRequest::default()).await;
        assert_eq!(page.items, vec![a.clone()]);

        let motos = store.motorcycles_in_yard(a.id).await.unwrap();
        assert_eq!(motos.len(), 1);
        assert!(store.motorcycles_in_yard(999).await.is_err());

        let err = store.delete_yard(a.id).await.unwrap_err();
        assert!(matches!(err, YardError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = Store::new();
        let input = UserInput {
            name: "Ana".to_string(),
            email: " Ana@Example.com ".to_string(),
            password: "x".to_string(),
            status: None,
            role: "USER".to_string(),
            yard_id: None,
        };
        let user = store.create_user(&input, Role::User, "h".to_string()).await.unwrap();
        assert_eq!(user.email, "Ana@Example.com");
        assert_eq!(user.status, crate::domain::DEFAULT_USER_STATUS);

        let found = store.find_user_by_email("ana@example.COM").await.unwrap();
        assert_eq!(found.id, user.id);

        let err = store
            .create_user(&input, Role::User, "h".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, YardError::Conflict(_)));
    }
}
