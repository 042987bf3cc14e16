//! Markers, positions and distance measurements

use super::fleet::ensure_reference;
use super::{Page, PageRequest, Store};
use crate::domain::{
    DistanceMeasurement, FixedMarker, FixedMarkerInput, Id, MeasurementInput, MobileMarker,
    MobileMarkerInput, Position, PositionInput,
};
use crate::error::{Result, YardError};
use crate::prediction::{Coordinates, MeasurementRow};

const IN_REVIEW_STATUS: &str = "revisão";

impl Store {
    // ---- fixed markers ----

    pub async fn list_fixed_markers(&self, request: PageRequest) -> Page<FixedMarker> {
        self.fixed_markers.page(request).await
    }

    pub async fn get_fixed_marker(&self, id: Id) -> Result<FixedMarker> {
        self.fixed_markers
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("fixed marker", id))
    }

    pub async fn fixed_markers_in_yard(&self, yard_id: Id, request: PageRequest) -> Page<FixedMarker> {
        self.fixed_markers
            .page_where(request, |m| m.yard_id == Some(yard_id))
            .await
    }

    pub async fn find_fixed_marker_by_code(&self, code: &str) -> Result<FixedMarker> {
        let wanted = code.to_lowercase();
        let markers = self.fixed_markers.rows.read().await;
        markers
            .values()
            .find(|m| m.aruco_code.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| YardError::not_found("fixed marker with code", code))
    }

    pub async fn create_fixed_marker(&self, input: FixedMarkerInput) -> Result<FixedMarker> {
        input.validate()?;
        let yards = self.yards.rows.read().await;
        ensure_reference(&yards, "yard", input.yard_id)?;
        let mut markers = self.fixed_markers.rows.write().await;

        let marker = FixedMarker {
            id: self.fixed_markers.next_id(),
            aruco_code: input.aruco_code,
            x: input.x,
            y: input.y,
            yard_id: input.yard_id,
        };
        markers.insert(marker.id, marker.clone());
        Ok(marker)
    }

    pub async fn delete_fixed_marker(&self, id: Id) -> Result<()> {
        let mut markers = self.fixed_markers.rows.write().await;
        if !markers.contains_key(&id) {
            return Err(YardError::not_found("fixed marker", id));
        }
        let measurements = self.measurements.rows.read().await;
        if measurements.values().any(|m| m.marker_id == Some(id)) {
            return Err(YardError::Conflict(format!(
                "fixed marker {} has recorded measurements",
                id
            )));
        }
        markers.remove(&id);
        Ok(())
    }

    // ---- mobile markers ----

    pub async fn list_mobile_markers(&self, request: PageRequest) -> Page<MobileMarker> {
        self.mobile_markers.page(request).await
    }

    pub async fn get_mobile_marker(&self, id: Id) -> Result<MobileMarker> {
        self.mobile_markers
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("mobile marker", id))
    }

    pub async fn find_mobile_marker_by_code(&self, code: &str) -> Result<MobileMarker> {
        let wanted = code.to_lowercase();
        let markers = self.mobile_markers.rows.read().await;
        markers
            .values()
            .find(|m| m.aruco_code.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| YardError::not_found("mobile marker with code", code))
    }

    pub async fn mobile_marker_of_motorcycle(&self, motorcycle_id: Id) -> Result<MobileMarker> {
        let markers = self.mobile_markers.rows.read().await;
        markers
            .values()
            .find(|m| m.motorcycle_id == Some(motorcycle_id))
            .cloned()
            .ok_or_else(|| YardError::not_found("mobile marker for motorcycle", motorcycle_id))
    }

    pub async fn create_mobile_marker(&self, input: MobileMarkerInput) -> Result<MobileMarker> {
        input.validate()?;
        let motorcycles = self.motorcycles.rows.read().await;
        ensure_reference(&motorcycles, "motorcycle", input.motorcycle_id)?;
        let mut markers = self.mobile_markers.rows.write().await;

        let marker = MobileMarker {
            id: self.mobile_markers.next_id(),
            aruco_code: input.aruco_code,
            installed_at: input.installed_at,
            motorcycle_id: input.motorcycle_id,
        };
        markers.insert(marker.id, marker.clone());
        Ok(marker)
    }

    pub async fn update_mobile_marker(&self, id: Id, input: MobileMarkerInput) -> Result<MobileMarker> {
        input.validate()?;
        let motorcycles = self.motorcycles.rows.read().await;
        ensure_reference(&motorcycles, "motorcycle", input.motorcycle_id)?;
        let mut markers = self.mobile_markers.rows.write().await;

        let marker = markers
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("mobile marker", id))?;
        marker.aruco_code = input.aruco_code;
        marker.installed_at = input.installed_at;
        marker.motorcycle_id = input.motorcycle_id;
        Ok(marker.clone())
    }

    pub async fn delete_mobile_marker(&self, id: Id) -> Result<()> {
        self.mobile_markers
            .rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| YardError::not_found("mobile marker", id))
    }

    // ---- positions ----

    pub async fn list_positions(&self, request: PageRequest) -> Page<Position> {
        self.positions.page(request).await
    }

    pub async fn get_position(&self, id: Id) -> Result<Position> {
        self.positions
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("position", id))
    }

    pub async fn positions_by_motorcycle(&self, motorcycle_id: Id, request: PageRequest) -> Page<Position> {
        self.positions
            .page_where(request, |p| p.motorcycle_id == Some(motorcycle_id))
            .await
    }

    /// Most recent first; positions without a timestamp sort last.
    pub async fn position_history(&self, motorcycle_id: Id, request: PageRequest) -> Page<Position> {
        let positions = self.positions.rows.read().await;
        let mut history: Vec<Position> = positions
            .values()
            .filter(|p| p.motorcycle_id == Some(motorcycle_id))
            .cloned()
            .collect();
        history.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Page::from_ordered(history, request)
    }

    /// Positions of motorcycles whose status is "revisão" in any letter case.
    pub async fn positions_in_review(&self, request: PageRequest) -> Page<Position> {
        let motorcycles = self.motorcycles.rows.read().await;
        let positions = self.positions.rows.read().await;
        Page::from_ordered(
            positions
                .values()
                .filter(|p| {
                    p.motorcycle_id
                        .and_then(|id| motorcycles.get(&id))
                        .is_some_and(|m| m.status.to_lowercase() == IN_REVIEW_STATUS)
                })
                .cloned(),
            request,
        )
    }

    pub async fn create_position(&self, input: PositionInput) -> Result<Position> {
        input.validate()?;
        let yards = self.yards.rows.read().await;
        let motorcycles = self.motorcycles.rows.read().await;
        ensure_reference(&yards, "yard", input.yard_id)?;
        ensure_reference(&motorcycles, "motorcycle", input.motorcycle_id)?;
        let mut positions = self.positions.rows.write().await;

        let position = input.into_position(self.positions.next_id());
        positions.insert(position.id, position.clone());
        Ok(position)
    }

    pub async fn update_position(&self, id: Id, input: PositionInput) -> Result<Position> {
        input.validate()?;
        let yards = self.yards.rows.read().await;
        let motorcycles = self.motorcycles.rows.read().await;
        ensure_reference(&yards, "yard", input.yard_id)?;
        ensure_reference(&motorcycles, "motorcycle", input.motorcycle_id)?;
        let mut positions = self.positions.rows.write().await;

        let position = positions
            .get_mut(&id)
            .ok_or_else(|| YardError::not_found("position", id))?;
        *position = input.into_position(id);
        Ok(position.clone())
    }

    pub async fn delete_position(&self, id: Id) -> Result<()> {
        let mut positions = self.positions.rows.write().await;
        if !positions.contains_key(&id) {
            return Err(YardError::not_found("position", id));
        }
        let measurements = self.measurements.rows.read().await;
        if measurements.values().any(|m| m.position_id == Some(id)) {
            return Err(YardError::Conflict(format!(
                "position {} has recorded measurements",
                id
            )));
        }
        positions.remove(&id);
        Ok(())
    }

    // ---- measurements ----

    pub async fn list_measurements(&self, request: PageRequest) -> Page<DistanceMeasurement> {
        self.measurements.page(request).await
    }

    pub async fn get_measurement(&self, id: Id) -> Result<DistanceMeasurement> {
        self.measurements
            .get(id)
            .await
            .ok_or_else(|| YardError::not_found("measurement", id))
    }

    pub async fn measurements_by_position(&self, position_id: Id, request: PageRequest) -> Page<DistanceMeasurement> {
        self.measurements
            .page_where(request, |m| m.position_id == Some(position_id))
            .await
    }

    pub async fn measurements_by_marker(&self, marker_id: Id, request: PageRequest) -> Page<DistanceMeasurement> {
        self.measurements
            .page_where(request, |m| m.marker_id == Some(marker_id))
            .await
    }

    pub async fn count_measurements_by_position(&self, position_id: Id) -> usize {
        let measurements = self.measurements.rows.read().await;
        measurements
            .values()
            .filter(|m| m.position_id == Some(position_id))
            .count()
    }

    pub async fn create_measurement(&self, input: MeasurementInput) -> Result<DistanceMeasurement> {
        input.validate()?;
        let markers = self.fixed_markers.rows.read().await;
        let positions = self.positions.rows.read().await;
        ensure_reference(&markers, "fixed marker", input.marker_id)?;
        ensure_reference(&positions, "position", input.position_id)?;
        let mut measurements = self.measurements.rows.write().await;

        let measurement = DistanceMeasurement {
            id: self.measurements.next_id(),
            distance: input.distance,
            position_id: input.position_id,
            marker_id: input.marker_id,
        };
        measurements.insert(measurement.id, measurement.clone());
        Ok(measurement)
    }

    /// Joins every complete measurement to the coordinates of its position and
    /// marker, in measurement-id order. A reference to a row that no longer
    /// exists comes back as `None`.
    pub async fn measurement_rows(&self) -> Vec<MeasurementRow> {
        let markers = self.fixed_markers.rows.read().await;
        let positions = self.positions.rows.read().await;
        let measurements = self.measurements.rows.read().await;

        measurements
            .values()
            .filter(|m| m.is_complete())
            .filter_map(|m| {
                let distance = m.distance?;
                let position = positions.get(&m.position_id?).map(Coordinates::of_position);
                let marker = markers.get(&m.marker_id?).map(Coordinates::of_marker);
                Some(MeasurementRow {
                    measurement_id: m.id,
                    distance,
                    position,
                    marker,
                })
            })
            .collect()
    }
}
