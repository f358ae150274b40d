use std::fmt;

/// An axis aligned box in EPSG:3857 (Web Mercator) metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MercatorBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl MercatorBBox {
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// SQL expression building this box as a PostGIS geometry.
	pub fn to_sql(&self) -> String {
		format!(
			"ST_MakeEnvelope({}, {}, {}, {}, 3857)",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl fmt::Display for MercatorBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn to_sql() {
		let bbox = MercatorBBox {
			x_min: -1.5,
			y_min: 0.0,
			x_max: 2.0,
			y_max: 4.25,
		};
		assert_eq!(bbox.to_sql(), "ST_MakeEnvelope(-1.5, 0, 2, 4.25, 3857)");
		assert_eq!(bbox.width(), 3.5);
		assert_eq!(bbox.height(), 4.25);
		assert_eq!(bbox.to_string(), "[-1.5, 0, 2, 4.25]");
	}
}
