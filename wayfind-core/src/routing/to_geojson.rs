use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::{
    Error,
    model::{InstructionStep, Route},
};

impl Route {
    /// Converts the route to a `GeoJSON` `FeatureCollection` in local map
    /// coordinates: the path as a `LineString`, then one `Point` per step.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.instructions.len() + 1);
        features.push(self.path_feature()?);
        for step in &self.instructions {
            features.push(step_feature(step)?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    fn path_feature(&self) -> Result<Feature, Error> {
        let line = self.line_string();
        // A one-node route has no extent; emit its point instead of a degenerate line
        let geometry = match self.waypoints.as_slice() {
            [only] => Geometry::new(GeoJsonValue::from(&Point::new(only.x, only.y))),
            _ => Geometry::new(GeoJsonValue::from(&line)),
        };

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "feature_type": "route",
                "route_id": self.id,
                "name": self.name,
                "map_id": self.map_id,
                "route_type": self.route_type,
                "total_distance": self.total_distance,
                "estimated_time": self.estimated_time,
                "difficulty": self.difficulty,
                "accessible": self.accessible,
                "emergency": self.emergency,
            }
        });

        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn step_feature(step: &InstructionStep) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&Point::new(step.x, step.y)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "feature_type": "step",
            "step": step.step,
            "action": step.action,
            "instruction": step.instruction,
            "node_id": step.node_id,
            "floor_level": step.floor_level,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        MapId, NodeId, RouteId,
        model::{DifficultyLevel, RouteType, StepAction, Waypoint},
    };

    fn route(points: &[(f64, f64)]) -> Route {
        let waypoints: Vec<Waypoint> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Waypoint {
                node_id: NodeId::from_u128(i as u128),
                name: None,
                x,
                y,
                floor_level: 0,
            })
            .collect();
        let instructions = waypoints
            .iter()
            .enumerate()
            .map(|(i, w)| InstructionStep {
                step: i + 1,
                action: StepAction::ContinueStraight,
                instruction: String::new(),
                node_id: w.node_id,
                x: w.x,
                y: w.y,
                floor_level: 0,
            })
            .collect();
        Route {
            id: RouteId::from_u128(1),
            name: "A to B".into(),
            map_id: MapId::from_u128(1),
            from_node: NodeId::from_u128(0),
            to_node: NodeId::from_u128(points.len() as u128 - 1),
            path: (0..points.len() as u128).map(NodeId::from_u128).collect(),
            route_type: RouteType::Shortest,
            total_distance: 0.0,
            estimated_time: 0,
            difficulty: DifficultyLevel::Easy,
            accessible: true,
            emergency: false,
            restricted: false,
            waypoints,
            instructions,
            created_by: "tester".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn path_and_step_features() {
        let collection = route(&[(0.0, 0.0), (3.0, 4.0)]).to_geojson().unwrap();
        assert_eq!(collection.features.len(), 3);

        let path = &collection.features[0];
        assert!(matches!(
            path.geometry.as_ref().map(|g| &g.value),
            Some(GeoJsonValue::LineString(coords)) if coords.len() == 2
        ));
        assert_eq!(
            path.property("route_type").and_then(|v| v.as_str()),
            Some("SHORTEST")
        );
    }

    #[test]
    fn single_node_route_is_a_point() {
        let collection = route(&[(1.0, 1.0)]).to_geojson().unwrap();
        assert!(matches!(
            collection.features[0].geometry.as_ref().map(|g| &g.value),
            Some(GeoJsonValue::Point(_))
        ));
    }
}
