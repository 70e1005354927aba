use crate::models::{
    common::{math_utils, Point2D, Position3D},
    trajectory::{Trajectory, TrajectorySample},
    traits::{IAgent, IMovable, ISteerable},
};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, trace};

/// 目標到達とみなす距離の余裕（旋回半径に加算、m）
pub const ARRIVAL_TOLERANCE: f64 = 0.5;

/// UAVの飛行モード
///
/// 旋回中の位相は待機モードでのみ意味を持つため、列挙子に保持します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightMode {
    /// 目標地点に向けて飛行中
    Flying,
    /// 目標地点を中心に旋回半径で周回中
    Awaiting {
        /// 旋回円上の位相（ラジアン、-π〜π）
        orbit_phase: f64,
    },
}

impl FlightMode {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, FlightMode::Awaiting { .. })
    }
}

/// UAVエージェント
///
/// 一定速度で飛行し、旋回半径から決まる最大旋回レートの範囲内で
/// 目標地点へ向けて方位を変えます。目標地点に近づくと旋回円上に
/// 乗り移り、新しい目標が指示されるまで周回を続けます。
#[derive(Debug, Clone)]
pub struct Uav {
    /// UAVの識別子（0始まりの連番）
    id: usize,
    /// 現在位置（高度は更新しない）
    position: Position3D,
    /// 速さ（m/s、生成後は不変）
    speed: f64,
    /// 方位角（度、0〜360、x軸正方向から反時計回り）
    heading: f64,
    /// 最小旋回半径（m、生成後は不変）
    turn_radius: f64,
    /// 現在の目標地点
    target: Point2D,
    /// 飛行モード
    mode: FlightMode,
    /// 航跡記録
    trajectory: Trajectory,
}

impl Uav {
    /// 新しいUAVを作成
    ///
    /// 初期目標は自身の初期位置、初期モードは飛行中です。
    ///
    /// # 引数
    ///
    /// * `id` - UAVの識別子
    /// * `position` - 初期位置
    /// * `speed` - 速さ（m/s）
    /// * `heading` - 初期方位角（度）
    /// * `turn_radius` - 最小旋回半径（m、正の値）
    pub fn new(id: usize, position: Position3D, speed: f64, heading: f64, turn_radius: f64) -> Self {
        Self {
            id,
            position,
            speed,
            heading: math_utils::normalize_heading(heading),
            turn_radius,
            target: position.xy(),
            mode: FlightMode::Flying,
            trajectory: Trajectory::new(),
        }
    }

    pub fn turn_radius(&self) -> f64 {
        self.turn_radius
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// 現在の目標地点までの水平距離
    pub fn distance_to_target(&self) -> f64 {
        self.position.distance_to_point(&self.target)
    }

    /// 1ティック分の状態更新
    ///
    /// 飛行中は旋回レート制限の下で方位と位置を更新し、目標に十分近づいた
    /// 場合はそのティック内で待機モードへ移行します（移行ティックは航跡に
    /// 記録されません）。待機中は一定角速度で旋回円上を進みます。
    ///
    /// # 引数
    ///
    /// * `dt` - 時間刻み（秒）
    /// * `current_time` - 現在のシミュレーション時刻（秒）
    pub fn update(&mut self, dt: f64, current_time: f64) {
        match self.mode {
            FlightMode::Flying => {
                if self.fly_toward_target(dt) {
                    return;
                }
            }
            FlightMode::Awaiting { orbit_phase } => self.orbit(orbit_phase, dt),
        }

        self.trajectory.record(TrajectorySample::new(
            current_time,
            self.position.x,
            self.position.y,
            self.heading,
        ));
    }

    /// 目標の旋回円への接線方向となる要求方位を計算（度）
    ///
    /// 目標が旋回半径より内側にある場合は、目標方向から90度ずらした
    /// 方位をそのまま用います。
    pub fn intercept_heading(&self) -> f64 {
        let dx = self.target.x - self.position.x;
        let dy = self.target.y - self.position.y;
        let distance = dx.hypot(dy);
        let bearing = dy.atan2(dx);

        let heading_rad = if distance > self.turn_radius {
            let intersection_angle = (self.turn_radius / distance).acos();
            bearing + (FRAC_PI_2 - intersection_angle)
        } else {
            bearing + FRAC_PI_2
        };

        math_utils::normalize_heading(math_utils::rad_to_deg(heading_rad))
    }

    /// 1ティックで変更可能な最大方位変化量（度）
    pub fn max_turn_per_step(&self, dt: f64) -> f64 {
        math_utils::rad_to_deg(self.speed / self.turn_radius) * dt
    }

    /// 飛行中の更新。待機モードへ移行した場合はtrueを返す。
    fn fly_toward_target(&mut self, dt: f64) -> bool {
        let desired_heading = self.intercept_heading();
        let delta = math_utils::angle_difference(self.heading, desired_heading);
        let max_turn = self.max_turn_per_step(dt);

        let heading = if delta.abs() <= max_turn {
            desired_heading
        } else {
            self.heading + max_turn.copysign(delta)
        };
        self.heading = math_utils::normalize_heading(heading);

        let heading_rad = math_utils::deg_to_rad(self.heading);
        let step = self.speed * dt;
        self.position.x += step * heading_rad.cos();
        self.position.y += step * heading_rad.sin();

        if self.distance_to_target() <= self.turn_radius + ARRIVAL_TOLERANCE {
            self.enter_orbit();
            return true;
        }

        false
    }

    /// 現在位置に最も近い旋回円上の点へ移り、待機モードに入る
    fn enter_orbit(&mut self) {
        let orbit_phase = (self.position.y - self.target.y).atan2(self.position.x - self.target.x);
        self.place_on_orbit(orbit_phase);
        self.mode = FlightMode::Awaiting { orbit_phase };

        debug!(
            "UAV{} 待機モード移行: 中心=({:.2}, {:.2}) 半径={:.2}",
            self.id, self.target.x, self.target.y, self.turn_radius
        );
    }

    /// 待機中の更新。位相は時計回り（減少方向）に進む。
    fn orbit(&mut self, orbit_phase: f64, dt: f64) {
        let angular_speed = self.speed / self.turn_radius;
        let orbit_phase = math_utils::normalize_radians(orbit_phase - angular_speed * dt);
        self.place_on_orbit(orbit_phase);
        self.mode = FlightMode::Awaiting { orbit_phase };
    }

    /// 旋回円上の位相に位置と接線方位を合わせる
    fn place_on_orbit(&mut self, orbit_phase: f64) {
        self.position.x = self.target.x + self.turn_radius * orbit_phase.cos();
        self.position.y = self.target.y + self.turn_radius * orbit_phase.sin();
        self.heading = math_utils::normalize_heading(math_utils::rad_to_deg(orbit_phase - FRAC_PI_2));
    }
}

impl IAgent for Uav {
    fn tick(&mut self, dt: f64, current_time: f64) {
        self.update(dt, current_time);
    }

    fn get_id(&self) -> usize {
        self.id
    }
}

impl IMovable for Uav {
    fn get_position(&self) -> Position3D {
        self.position
    }

    fn get_heading(&self) -> f64 {
        self.heading
    }

    fn get_speed(&self) -> f64 {
        self.speed
    }
}

impl ISteerable for Uav {
    /// 目標地点を差し替え、モードに関わらず飛行中に戻す
    fn set_target(&mut self, target: Point2D) {
        if self.mode.is_awaiting() {
            trace!("UAV{} 待機解除", self.id);
        }
        self.target = target;
        self.mode = FlightMode::Flying;
    }

    fn get_target(&self) -> Point2D {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uav_at_origin() -> Uav {
        Uav::new(0, Position3D::new(0.0, 0.0, 0.0), 1.0, 0.0, 5.0)
    }

    #[test]
    fn test_new_uav_targets_own_position() {
        let uav = Uav::new(3, Position3D::new(10.0, -4.0, 120.0), 2.0, -90.0, 5.0);
        assert_eq!(uav.get_id(), 3);
        assert_eq!(uav.get_target(), Point2D::new(10.0, -4.0));
        assert_eq!(uav.mode(), FlightMode::Flying);
        assert!((uav.get_heading() - 270.0).abs() < 1e-12);
        assert!(uav.trajectory().is_empty());
    }

    #[test]
    fn test_far_target_keeps_flying_straight() {
        let mut uav = uav_at_origin();
        uav.set_target(Point2D::new(100.0, 0.0));

        let mut last_x = uav.get_position().x;
        for step in 0..11 {
            uav.update(1.0, step as f64);
            let position = uav.get_position();
            assert!(position.x > last_x);
            last_x = position.x;
            assert!(uav.get_heading() < 10.0, "heading {}", uav.get_heading());
            assert_eq!(uav.mode(), FlightMode::Flying);
        }
        assert_eq!(uav.trajectory().len(), 11);
        assert_eq!(uav.get_position().z, 0.0);
    }

    #[test]
    fn test_turn_rate_is_limited() {
        let mut uav = uav_at_origin();
        // 真後ろの目標
        uav.set_target(Point2D::new(-100.0, 0.0));
        let max_turn = uav.max_turn_per_step(1.0);

        let before = uav.get_heading();
        uav.update(1.0, 0.0);
        let change = math_utils::angle_difference(before, uav.get_heading()).abs();
        assert!((change - max_turn).abs() < 1e-9);
    }

    #[test]
    fn test_small_heading_error_snaps_to_intercept_heading() {
        let mut uav = uav_at_origin();
        uav.set_target(Point2D::new(100.0, 0.0));
        let desired = uav.intercept_heading();
        uav.update(1.0, 0.0);
        assert!((uav.get_heading() - desired).abs() < 1e-12);
    }

    #[test]
    fn test_target_inside_turn_radius_enters_orbit_on_first_tick() {
        let mut uav = uav_at_origin();
        uav.set_target(Point2D::new(3.0, 0.0));

        uav.update(1.0, 0.0);
        assert!(uav.mode().is_awaiting());
        // 移行ティックは記録されない
        assert!(uav.trajectory().is_empty());
        assert!((uav.distance_to_target() - 5.0).abs() < 1e-9);

        for step in 1..50 {
            uav.update(1.0, step as f64);
            assert!((uav.distance_to_target() - 5.0).abs() < 1e-9);
        }
        assert_eq!(uav.trajectory().len(), 49);
    }

    #[test]
    fn test_orbit_runs_clockwise_with_tangent_heading() {
        let mut uav = uav_at_origin();
        uav.set_target(Point2D::new(3.0, 0.0));
        uav.update(1.0, 0.0);

        let FlightMode::Awaiting { orbit_phase: before } = uav.mode() else {
            panic!("expected orbit");
        };
        uav.update(1.0, 1.0);
        let FlightMode::Awaiting { orbit_phase: after } = uav.mode() else {
            panic!("expected orbit");
        };

        let advanced = math_utils::normalize_radians(after - before);
        assert!((advanced + 0.2).abs() < 1e-12);

        let expected_heading = math_utils::normalize_heading(math_utils::rad_to_deg(after - FRAC_PI_2));
        assert!((uav.get_heading() - expected_heading).abs() < 1e-9);
    }

    #[test]
    fn test_idle_uav_orbits_start_point_without_drift() {
        let mut uav = Uav::new(0, Position3D::new(20.0, 30.0, 50.0), 1.0, 45.0, 5.0);

        uav.update(0.1, 0.0);
        assert!(uav.mode().is_awaiting());

        for step in 1..20_000 {
            uav.update(0.1, step as f64 * 0.1);
            assert!((uav.distance_to_target() - 5.0).abs() < 1e-9);
        }
        assert_eq!(uav.get_target(), Point2D::new(20.0, 30.0));
        assert_eq!(uav.get_position().z, 50.0);
    }

    #[test]
    fn test_set_target_leaves_orbit() {
        let mut uav = uav_at_origin();
        uav.set_target(Point2D::new(3.0, 0.0));
        uav.update(1.0, 0.0);
        assert!(uav.mode().is_awaiting());

        uav.set_target(Point2D::new(200.0, 200.0));
        assert_eq!(uav.mode(), FlightMode::Flying);
        uav.update(1.0, 1.0);
        assert_eq!(uav.mode(), FlightMode::Flying);
        assert_eq!(uav.trajectory().len(), 1);
    }

    #[test]
    fn test_heading_stays_in_range() {
        let targets = [
            Point2D::new(-50.0, -50.0),
            Point2D::new(0.0, -80.0),
            Point2D::new(40.0, 1.0),
            Point2D::new(-1.0, 0.0),
            Point2D::new(60.0, -60.0),
        ];
        let mut uav = Uav::new(0, Position3D::new(0.0, 0.0, 0.0), 7.0, 359.9, 12.0);

        let mut time = 0.0;
        for target in targets {
            uav.set_target(target);
            for _ in 0..200 {
                uav.update(0.25, time);
                time += 0.25;
                let heading = uav.get_heading();
                assert!((0.0..360.0).contains(&heading), "heading {}", heading);
                if uav.mode().is_awaiting() {
                    assert!((uav.distance_to_target() - 12.0).abs() < 1e-9);
                }
            }
        }
        assert!(uav.trajectory().iter().all(|s| (0.0..360.0).contains(&s.heading)));
    }
}
