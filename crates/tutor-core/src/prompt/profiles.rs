//! Grade style profiles and subject guidance.

use serde::Serialize;

use crate::curriculum::{Grade, Subject};

/// Reading level and diagram complexity for one grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeProfile {
    pub name: &'static str,
    pub age_range: &'static str,
    pub style: &'static str,
    pub svg_complexity: &'static str,
    pub explanation_length: &'static str,
    /// Font size for main letters and numbers inside the diagram.
    pub svg_font_size_large: &'static str,
    /// Font size for small labels inside the diagram.
    pub svg_font_size_small: &'static str,
}

const PROFILES: [GradeProfile; 6] = [
    GradeProfile {
        name: "الصف الأول الابتدائي",
        age_range: "6-7 سنوات",
        style: "مرح جداً، لغة بسيطة للغاية، استخدام إيموجي وأمثلة من عالم الطفل (ألعاب، حيوانات، حلويات).",
        svg_complexity: "بسيط جداً، ألوان زاهية، أشكال كبيرة وواضحة، وجوه مبتسمة اختيارية للعناصر.",
        explanation_length: "20-50 كلمة",
        svg_font_size_large: "100px",
        svg_font_size_small: "20px",
    },
    GradeProfile {
        name: "الصف الثاني الابتدائي",
        age_range: "7-8 سنوات",
        style: "مرح وودود، لغة بسيطة مع بعض المفردات الجديدة، أمثلة من الحياة اليومية والمدرسة.",
        svg_complexity: "بسيط إلى متوسط، ألوان جذابة، تفاصيل أوضح قليلاً، يمكن تضمين تسميات نصية.",
        explanation_length: "30-70 كلمة",
        svg_font_size_large: "90px",
        svg_font_size_small: "18px",
    },
    GradeProfile {
        name: "الصف الثالث الابتدائي",
        age_range: "8-9 سنوات",
        style: "واضح ومباشر، لغة سهلة مع إمكانية استخدام مصطلحات بسيطة جديدة، أمثلة واقعية ومترابطة.",
        svg_complexity: "متوسط، تفاصيل أكثر دقة، رسوم بيانية بسيطة إذا لزم الأمر، تسميات واضحة.",
        explanation_length: "40-90 كلمة",
        svg_font_size_large: "80px",
        svg_font_size_small: "16px",
    },
    GradeProfile {
        name: "الصف الرابع الابتدائي",
        age_range: "9-10 سنوات",
        style: "شرح تفصيلي أكثر بقليل، لغة واضحة مع استخدام مصطلحات منهجية. تشجيع التفكير النقدي.",
        svg_complexity: "متوسط إلى معقد قليلاً، يمكن أن يتضمن رسوماً بيانية بسيطة أو مخططات، تفاصيل دقيقة، تسميات متعددة.",
        explanation_length: "60-120 كلمة",
        svg_font_size_large: "70px",
        svg_font_size_small: "14px",
    },
    GradeProfile {
        name: "الصف الخامس الابتدائي",
        age_range: "10-11 سنوات",
        style: "أسلوب تعليمي موجه، لغة أكاديمية مبسطة، ربط المفاهيم ببعضها. حث على الاستنتاج.",
        svg_complexity: "معقد نسبياً، رسوم بيانية تفصيلية، مخططات سير، توضيحات علمية أو رياضية دقيقة.",
        explanation_length: "80-150 كلمة",
        svg_font_size_large: "60px",
        svg_font_size_small: "12px",
    },
    GradeProfile {
        name: "الصف السادس الابتدائي",
        age_range: "11-12 سنوات",
        style: "أسلوب احترافي ومختصر، لغة أكاديمية، مراجعة للمفاهيم السابقة وتقديم مفاهيم جديدة. تشجيع البحث.",
        svg_complexity: "معقد، يمكن أن يحتوي على مراحل، رسوم توضيحية مفصلة، جداول، مقارنات بصرية.",
        explanation_length: "100-200 كلمة",
        svg_font_size_large: "50px",
        svg_font_size_small: "10px",
    },
];

pub fn grade_profile(grade: Grade) -> &'static GradeProfile {
    &PROFILES[usize::from(grade.number()) - 1]
}

/// Canvas settings every diagram shares.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SvgCanvas {
    pub width: u32,
    pub height: u32,
    pub background: &'static str,
    pub stroke: &'static str,
    pub text_color: &'static str,
    pub palette: &'static [&'static str],
}

pub const SVG_CANVAS: SvgCanvas = SvgCanvas {
    width: 700,
    height: 500,
    background: "white",
    stroke: "#333333",
    text_color: "#2C3E50",
    palette: &["#FF6B6B", "#4ECDC4", "#45B7D1", "#FED766", "#2AB7CA"],
};

/// Subject-specific teaching bullets.
pub fn subject_guidance(subject: Subject) -> &'static [&'static str] {
    match subject {
        Subject::Arabic => &[
            "ركز على الحروف، الكلمات، الحركات (الفتحة، الضمة، الكسرة)، المدود، التنوين، القراءة، الكتابة، حسب السؤال.",
            "إذا كان السؤال عن حرف، ارسم الحرف كبيراً وواضحاً مع أي حركات مطلوبة. يمكنك إضافة شكل بسيط يتعلق بالحرف (مثل بطة لحرف الباء).",
            "إذا كان السؤال عن كلمة، اكتب الكلمة بخط واضح مع إظهار الحروف والحركات.",
            "استخدم أسلوباً تفاعلياً، كأن تسأل الطفل \"هل أنت مستعد لنتعلم حرف الألف يا بطل؟\".",
            "اربط الحروف والكلمات بأمثلة من حياة الطفل اليومية.",
        ],
        Subject::Math => &[
            "ركز على الأرقام، العد، الجمع، الطرح، الضرب، القسمة، الأشكال الهندسية البسيطة، حسب السؤال ومستوى الصف.",
            "إذا كان السؤال عن عملية حسابية (مثل 1+1)، وضحها بالرسم باستخدام أشياء مألوفة (تفاح، كرات، نجوم).",
            "إذا كان عن الأشكال الهندسية، ارسم الشكل المطلوب بوضوح مع تسميته وإظهار خصائصه.",
            "إذا كان عن الأرقام، ارسم الرقم كبيراً مع عرض الكمية التي يمثلها بصرياً.",
            "استخدم ألواناً مختلفة لتمييز العناصر الرياضية المختلفة.",
        ],
        Subject::Science => &[
            "ركز على مفاهيم العلوم البسيطة مثل أجزاء النبات، الحيوانات وأنواعها، حالات الماء، الحواس الخمس، دورة حياة الكائنات، البيئة، الطقس.",
            "إذا كان المفهوم يتضمن أجزاء، ارسم كل جزء بوضوح مع تسميته (مثلاً لنبتة: الجذور، الساق، الأوراق، الزهرة).",
            "إذا كان المفهوم يتضمن عملية أو دورة، ارسمها كمخطط تدفق بسيط مع أسهم واضحة تشير إلى الترتيب.",
            "استخدم ألواناً واقعية تقريباً للمكونات العلمية (مثل الأخضر للنبات، الأزرق للماء).",
            "شجع الفضول العلمي بأسلوب \"هل تعلم أن...؟\" أو \"انظر كيف...\".",
        ],
        Subject::Social => &[
            "ركز على موضوعات مثل أفراد العائلة، أدواتي المدرسية، قواعد النظافة، المهن، آداب التعامل، السلامة.",
            "يمكن أن تكون الرسومات مشاهد بسيطة أو أيقونات تمثل المفهوم.",
            "إذا كان السؤال عن المهن، ارسم شخصاً يؤدي المهنة مع الأدوات المناسبة.",
            "استخدم أسلوباً يشجع على السلوكيات الجيدة والقيم الإيجابية.",
            "اربط المفاهيم بالحياة اليومية للطفل في البيت والمدرسة.",
        ],
        Subject::Islamic => &[
            "ركز على المفاهيم الإسلامية الأساسية المناسبة للعمر مثل أركان الإسلام، الوضوء، الصلاة بطريقة مبسطة جداً، الأدعية القصيرة، قصص الأنبياء المبسطة، الأخلاق الحسنة.",
            "يجب أن تكون الرسومات محتشمة وبسيطة، ويمكن استخدام رموز إسلامية بسيطة (هلال، مسجد بسيط، مصحف).",
            "إذا كان السؤال عن الوضوء أو الصلاة، ارسم الخطوات بطريقة مبسطة وواضحة.",
            "تجنب رسم صور ذات تفاصيل دقيقة للأشخاص، واستخدم أشكالاً رمزية بسيطة.",
            "استخدم أسلوباً هادئاً ولطيفاً يغرس القيم الإسلامية والأخلاق الحسنة.",
        ],
        Subject::English => &[
            "إذا كان السؤال عن حرف إنجليزي (e.g., \"Teach me the letter A\")، اشرحه بالإنجليزية وارسم الحرف كبيراً وواضحاً مع صورة بسيطة لكلمة تبدأ به (e.g., Apple for A).",
            "إذا كان السؤال عن كلمة إنجليزية (e.g., \"What is a cat?\")، اشرحها بالإنجليزية وارسمها إذا أمكن.",
            "إذا كان السؤال عن الألوان، الأرقام، أو المفردات الأساسية، قدم شرحاً بصرياً واضحاً.",
            "استخدم أسلوباً تفاعلياً: \"Hello little champion! Are you ready to learn about the letter A?\".",
            "اجعل التعلم ممتعاً ومشجعاً للطفل العربي الذي يتعلم الإنجليزية.",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_grade_has_a_matching_profile() {
        for grade in Grade::all() {
            assert_eq!(grade_profile(grade).name, grade.display_name());
        }
    }

    #[test]
    fn test_font_sizes_shrink_with_grade() {
        let first = grade_profile(Grade::Grade1);
        let sixth = grade_profile(Grade::Grade6);
        assert_eq!(first.svg_font_size_large, "100px");
        assert_eq!(sixth.svg_font_size_large, "50px");
    }
}
