//! Arabic wording of the explanation steps.

use crate::functions::linear_algebra::{RowOp, RowStep};
use crate::syntax::expr_to_string;

pub const DEGREE_NOTE: &str = "ملاحظة: اعتبرنا الزوايا بالدرجات، \
  فحوّلنا sin(θ°) تلقائياً إلى sin(pi*θ/180) قبل الحساب.";

// ─── Evaluate ───────────────────────────────────────────────────────

pub const SIMPLIFY_INTRO: &str = "نقوم بتبسيط التعبير خطوة بخطوة.";
pub const REAL_FUNCTION: &str =
  "هذه دالة حقيقية لأنها لا تحتوي على مقام متغير.";

pub fn simplified(before: &str, after: &str) -> String {
  format!("تبسيط: {before} ⟶ {after}")
}

pub fn final_value(value: &str) -> String {
  format!("القيمة النهائية هي: {value}")
}

pub fn approximate_value(value: &str) -> String {
  format!("القيمة التقريبية = {value}")
}

// ─── Fractions ──────────────────────────────────────────────────────

pub const DENOMINATOR_NONZERO: &str =
  "لا يمكن للدالة أن تكون معرّفة عندما يكون المقام = 0.";
pub const NOTHING_TO_CANCEL: &str =
  "لا توجد عوامل مشتركة بين البسط والمقام، فلا يمكن الاختصار.";

pub fn rational_function(var: &str) -> String {
  format!("هذه دالة كسرية لأنها تحتوي على مقام فيه المتغير {var}.")
}

pub fn denominator(den: &str) -> String {
  format!("المقام: {den}")
}

pub fn excluded_values(var: &str, values: &[String]) -> String {
  let list = values
    .iter()
    .map(|v| format!("{var} ≠ {v}"))
    .collect::<Vec<_>>()
    .join("، ");
  format!("القيم المستثناة من المجال: {list}")
}

pub fn factored(num: &str, den: &str) -> String {
  format!("نحلل البسط والمقام: ({num}) / ({den})")
}

pub fn cancelled(result: &str) -> String {
  format!("بعد اختصار العوامل المشتركة: {result}")
}

// ─── Derivatives ────────────────────────────────────────────────────

pub const CONSTANT_RULE: &str = "مشتقة الثابت تساوي صفراً.";
pub const SUM_RULE: &str = "قاعدة مجموع المشتقات: مشتقة (f + g) = f' + g'.";
pub const PRODUCT_RULE: &str = "قاعدة الضرب: مشتقة (f*g) = f'*g + f*g'.";
pub const QUOTIENT_RULE: &str =
  "قاعدة القسمة: مشتقة (f/g) = (f'*g - f*g')/g^2.";
pub const POWER_RULE: &str = "قاعدة القوة: مشتقة x^n هي n*x^(n-1).";
pub const EXPONENTIAL_RULE: &str =
  "مشتقة الدالة الأسية: مشتقة e^x هي e^x، ومشتقة a^x هي a^x*log(a).";
pub const CHAIN_RULE: &str =
  "قاعدة السلسلة: مشتقة f(g(x)) = f'(g(x)) * g'(x).";

pub fn derivative_intro(var: &str) -> String {
  format!("نريد إيجاد المشتقة بالنسبة إلى {var}.")
}

pub fn term_derivative(var: &str, term: &str, d: &str) -> String {
  format!("d/d{var}({term}) = {d}")
}

pub fn derivative_result(var: &str, expr: &str, d: &str) -> String {
  format!("نشتق بالنسبة إلى {var}: d/d{var}({expr}) = {d}")
}

pub fn nth_derivative(order: u32, d: &str) -> String {
  format!("المشتقة من الرتبة {order}: {d}")
}

pub fn vanishing_derivatives(reached: u32, order: u32) -> String {
  format!("المشتقة من الرتبة {reached} تساوي صفراً، لذا المشتقة من الرتبة {order} تساوي صفراً أيضاً.")
}

// ─── Integrals ──────────────────────────────────────────────────────

pub const CONSTANT_INTEGRAL: &str = "تكامل الثابت: ∫k dx = k*x.";
pub const LINEARITY: &str = "خاصية الخطية: ∫(f + g) dx = ∫f dx + ∫g dx.";
pub const POWER_RULE_INTEGRAL: &str =
  "قاعدة القوة: ∫x^n dx = x^(n+1)/(n+1) حيث n ≠ -1، و ∫1/x dx = log(x).";
pub const TABLE: &str = "نستخدم جدول التكاملات الأساسية.";
pub const TRIG_IDENTITY: &str =
  "نستخدم متطابقة مثلثية مثل sin(x)^2 = (1 - cos(2*x))/2 قبل التكامل.";
pub const EXPANSION: &str = "نفك الأقواس ثم نكامل حداً حداً.";
pub const SUBSTITUTION_HINT: &str =
  "قد نستخدم التعويض أو تجزئة التكامل حسب البنية.";
pub const CONSTANT_NOTE: &str =
  "ملاحظة: نضيف ثابت التكامل +C لأن التكامل غير محدد.";
pub const NUMERIC_INTEGRAL: &str = "لا توجد دالة أصلية مناسبة على هذه الفترة، \
  فنحسب القيمة عددياً بطريقة سيمبسون التكيفية.";

pub fn integral_intro(var: &str) -> String {
  format!("نريد حساب التكامل بالنسبة إلى {var}.")
}

pub fn substitution(u: &str) -> String {
  format!("نستخدم التعويض: u = {u}.")
}

pub fn by_parts(u: &str, dv: &str) -> String {
  format!(
    "نستخدم التكامل بالتجزئة: ∫u dv = u*v - ∫v du، حيث u = {u} و dv = {dv}."
  )
}

pub fn partial_fractions(decomposition: &str) -> String {
  format!("نفكك الكسر إلى كسور جزئية: {decomposition}")
}

pub fn term_integral(var: &str, term: &str, f: &str) -> String {
  format!("∫({term}) d{var} = {f}")
}

pub fn antiderivative(var: &str, expr: &str, f: &str) -> String {
  format!("نقوم بإيجاد تكامل: ∫({expr}) d{var} = {f} + C")
}

pub fn definite_setup(var: &str, expr: &str, lower: &str, upper: &str) -> String {
  format!("نحسب التكامل المحدد للدالة {expr} بالنسبة إلى {var} من {lower} إلى {upper}.")
}

pub fn primitive(var: &str, f: &str) -> String {
  format!("الدالة الأصلية: F({var}) = {f}")
}

pub fn fundamental_theorem(
  lower: &str,
  upper: &str,
  at_upper: &str,
  at_lower: &str,
) -> String {
  format!("F({upper}) - F({lower}) = {at_upper} - ({at_lower})")
}

pub fn definite_value(value: &str) -> String {
  format!("قيمة التكامل المحدد = {value}")
}

// ─── Equations ──────────────────────────────────────────────────────

pub const MOVE_TERMS: &str =
  "نقل كل الحدود إلى طرف واحد لجعلها مساوية للصفر حيث يلزم.";
pub const SYSTEM_METHOD: &str =
  "نحل النظام بالطرق الجبرية الرمزية (حذف/إحلال/جاوس-جوردان حسب البنية).";
pub const IDENTITY: &str = "المعادلة متحققة لكل قيم المتغير.";
pub const NEGATIVE_DISCRIMINANT: &str = "المميز سالب، لذا الجذور عقدية.";
pub const QUADRATIC_FORMULA: &str =
  "نطبق القانون العام: x = (-b ± sqrt(Δ)) / (2a).";
pub const NUMERIC_SCAN: &str = "لا توجد صيغة مغلقة للحل، \
  فنبحث عن الجذور عددياً بتتبع تغير الإشارة ثم التنصيف.";

pub fn equation_line(index: usize, lhs: &str, rhs: &str) -> String {
  format!("المعادلة {index}: {lhs} = {rhs}")
}

pub fn standard_form(form: &str) -> String {
  format!("الصيغة القياسية: {form} = 0")
}

pub fn rational_equation(den: &str) -> String {
  format!("نضرب الطرفين في المقام {den} بشرط ألا يساوي صفراً.")
}

pub fn linear(var: &str, a: &str) -> String {
  format!("معادلة من الدرجة الأولى: نعزل {var} ثم نقسم على المعامل {a}.")
}

pub fn quadratic(a: &str, b: &str, c: &str) -> String {
  format!("معادلة من الدرجة الثانية: a = {a}، b = {b}، c = {c}.")
}

pub fn discriminant(value: &str) -> String {
  format!("المميز Δ = b^2 - 4ac = {value}")
}

pub fn polynomial(degree: usize) -> String {
  format!("كثيرة حدود من الدرجة {degree}: نبحث عن الجذور النسبية ثم نقسم عليها.")
}

pub fn inverse_function(function: &str) -> String {
  format!("نطبق الدالة العكسية للدالة {function} على الطرفين.")
}

pub fn rejected(values: &[String]) -> String {
  format!("نستبعد {} لأنها تجعل المقام صفراً.", values.join("، "))
}

pub fn we_get(var: &str, value: &str) -> String {
  format!("نحصل على: {var} = {value}")
}

pub fn repeated_root(multiplicity: usize) -> String {
  format!(" (جذر مكرر {multiplicity} مرات)")
}

pub const APPROXIMATE_ROOT: &str = " (قيمة تقريبية)";

pub fn numbered_solution(index: usize, text: &str) -> String {
  format!("حل {index}: {text}")
}

pub fn augmented(matrix: &str) -> String {
  format!("المصفوفة الموسعة [A | b] = {matrix}")
}

pub fn substituted(var: &str, expr: &str) -> String {
  format!("من إحدى المعادلتين: {var} = {expr}، ونعوض في المعادلة الأخرى.")
}

pub fn free_variables(vars: &[String]) -> String {
  format!(
    "المتغيرات الحرة: {}؛ للنظام عدد لا نهائي من الحلول.",
    vars.join("، ")
  )
}

// ─── Matrices ───────────────────────────────────────────────────────

pub const TRIANGULAR: &str = "نحوّل المصفوفة إلى شكل مثلثي علوي؛ \
  المحدد هو حاصل ضرب عناصر القطر مع تغيير الإشارة عند كل تبديل.";
pub const INVERSE_METHOD: &str =
  "نطبق جاوس-جوردان على [A | I] حتى يصبح الطرف الأيسر مصفوفة الوحدة.";
pub const RREF_METHOD: &str =
  "نطبق عمليات الصفوف الأولية (جاوس-جوردان) للوصول إلى الشكل الدرجي المختزل.";

pub fn matrix_input(matrix: &str) -> String {
  format!("المصفوفة: A = {matrix}")
}

pub fn matrix_expression(expr: &str) -> String {
  format!("نحسب: {expr}")
}

pub fn matrix_result(matrix: &str) -> String {
  format!("الناتج = {matrix}")
}

pub fn determinant_2x2(a: &str, b: &str, c: &str, d: &str) -> String {
  format!("لمصفوفة 2×2: det = a*d - b*c = ({a})*({d}) - ({b})*({c})")
}

pub fn determinant_value(value: &str) -> String {
  format!("المحدد = {value}")
}

pub fn inverse_value(matrix: &str) -> String {
  format!("المعكوس A^-1 = {matrix}")
}

pub fn transpose_value(matrix: &str) -> String {
  format!("نبدّل الصفوف بالأعمدة: A^T = {matrix}")
}

pub fn rank_value(rank: usize) -> String {
  format!("الرتبة = عدد الصفوف غير الصفرية في الشكل المختزل = {rank}")
}

pub fn rref_value(matrix: &str) -> String {
  format!("الشكل الدرجي المختزل: {matrix}")
}

pub fn characteristic(poly: &str) -> String {
  format!("كثيرة الحدود المميزة: det(A - λI) = {poly}")
}

pub fn eigenvalue(value: &str) -> String {
  format!("قيمة ذاتية: λ = {value}")
}

pub fn eigenvector(vector: &str) -> String {
  format!("متجه ذاتي مرافق: {vector}")
}

fn row_op(op: &RowOp) -> String {
  let num = |n: &crate::functions::numeric::Number| expr_to_string(&n.to_expr());
  match op {
    RowOp::Swap(a, b) => format!("R{} ↔ R{}", a + 1, b + 1),
    RowOp::Scale { row, factor } => {
      format!("R{0} ← ({1})·R{0}", row + 1, num(factor))
    }
    RowOp::AddMultiple {
      target,
      source,
      factor,
    } => {
      if factor.is_negative() {
        format!("R{0} ← R{0} - ({1})·R{2}", target + 1, num(&factor.abs()), source + 1)
      } else {
        format!("R{0} ← R{0} + ({1})·R{2}", target + 1, num(factor), source + 1)
      }
    }
  }
}

/// `R2 ← R2 - (3)·R1: [[1, 2], [0, -2]]`
pub fn row_step(step: &RowStep) -> String {
  format!(
    "{}: {}",
    row_op(&step.op),
    expr_to_string(&step.after.to_expr())
  )
}
