use vt_core::Prompts;

pub const FRONT_IMAGE: &str = "Full-body front-view image of a person wearing the dress. The person is in a neutral position, hands relaxed and standing straight";

pub const REAR_IMAGE: &str = "Full-body rear-view image of a person wearing the dress. The person is in a neutral position, hands relaxed and standing straight";

pub const ROTATION_VIDEO: &str = "A person slowly rotates 180 degrees on their vertical axis against a clean studio background. The camera remains fixed in position capturing a front-facing view. The person begins facing the camera and smoothly rotates clockwise, revealing their side profile, back, and garments from all angles. The rotation is continuous and even-paced. Professional studio lighting remains constant. The person maintains their pose and posture throughout the entire rotation. High-quality, photorealistic rendering with consistent focus.";

pub fn default_prompts() -> Prompts {
    Prompts {
        front_image: FRONT_IMAGE.to_string(),
        rear_image: REAR_IMAGE.to_string(),
        video: ROTATION_VIDEO.to_string(),
    }
}
